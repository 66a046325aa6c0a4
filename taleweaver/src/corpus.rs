//! Labeled story requests used for training.

use crate::category::Category;

/// A training example.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Example {
    pub(crate) text: String,
    pub(crate) label: Category,
}

impl Example {
    pub fn new<S>(text: S, label: Category) -> Self
    where
        S: Into<String>,
    {
        Self {
            text: text.into(),
            label,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn label(&self) -> Category {
        self.label
    }
}

const FANTASY_ADVENTURE: &[&str] = &[
    "Take me on a dragon’s quest in a sky castle",
    "I want a tale of brave knights and hidden treasure",
    "Tell me about a magical forest and talking trees",
    "Adventure in a pirate ship across the seven seas",
    "A unicorn journey through rainbow valleys",
    "Sneak into a wizard’s tower and discover spells",
    "A lost city under the ocean with mermaid friends",
    "Journey across a desert on a camel caravan",
    "A space explorer discovers an alien planet",
    "A secret map leads to a mountain of gold",
    "A young hero’s quest to rescue a princess",
    "Battle trolls under a bridge to save a village",
    "Race against time in an enchanted clock tower",
    "A fairy guide leads you through moonlit caves",
    "Find a magic sword in an abandoned castle",
    "Ride a flying carpet over ancient ruins",
    "Explore hidden temples in a jungle",
    "A cloud kingdom where birds are your allies",
    "Discover a portal to a land of giants",
    "A knight and a dragon become unlikely friends",
];

const MORAL_QUEST: &[&str] = &[
    "Tell me a story about why honesty matters",
    "A tale teaching the value of sharing toys",
    "Why being kind to others is important",
    "A story about patience and waiting your turn",
    "How hard work leads to great rewards",
    "A lesson on saying sorry when you’re wrong",
    "Why we should help friends in need",
    "The importance of listening to your parents",
    "A fable about courage in the face of fear",
    "Why we shouldn’t judge others by looks",
    "A story showing respect for elders",
    "Teaching forgiveness after a fight",
    "Why it’s good to say ‘thank you’",
    "A tale of perseverance in learning to ride a bike",
    "Why telling the truth keeps friendships strong",
    "The power of teamwork to solve problems",
    "How responsibility makes you trustworthy",
    "Why it’s okay to ask for help",
    "A lesson on caring for pets responsibly",
    "Why showing gratitude makes people happy",
];

const NUMBER_JOURNEY: &[&str] = &[
    "Count the farm animals one by one",
    "Let’s count stars in the night sky",
    "A story that teaches numbers up to ten",
    "Counting apples as they drop from a tree",
    "One frog, two frogs, three jumping frogs",
    "Count the blocks while building a tower",
    "A train with five colorful carriages",
    "Counting shells on the sandy beach",
    "Seven balloons floating into the air",
    "Count the raindrops on your window",
    "Three little kittens and their mittens",
    "Count the cars in a busy parking lot",
    "One, two, buckle my shoe rhyme story",
    "Counting candies in a jar",
    "A parade with four marching bands",
    "Count the petals on a flower",
    "Five happy ducks swimming in a pond",
    "Count the leaves on a tree branch",
    "A birthday cake with six candles",
    "Count the fish in the aquarium",
];

const LULLABY_RHYME: &[&str] = &[
    "Sing me a gentle rhyme about moonlight",
    "A bedtime poem to calm my mind",
    "Soft bedtime lullaby with stars and sleep",
    "Rhyme about a sleepy teddy bear",
    "A poem about drifting on a cloud",
    "Rhyme to help little ones fall asleep",
    "Lullaby about the sun saying goodnight",
    "Soft rhyme of kittens curling up",
    "Bedtime poem with gentle ocean waves",
    "Rhyme about a cradle rocking slowly",
    "A soothing rhyme about dreams",
    "Lullaby with fireflies lighting the night",
    "Gentle poem of snowflakes softly falling",
    "Rhyme about a sleepy little owl",
    "Bedtime verse of a quiet forest",
    "Rhyme about a puppy snuggling down",
    "Lullaby of a starlit meadow",
    "Soft poem of raindrops tapping window",
    "Rhyme about a sleepy dragon’s yawn",
    "Gentle lullaby of a lull in the breeze",
];

/// Returns the built-in training corpus: twenty requests for each category.
pub fn default_corpus() -> Vec<Example> {
    [
        (Category::FantasyAdventure, FANTASY_ADVENTURE),
        (Category::MoralQuest, MORAL_QUEST),
        (Category::NumberJourney, NUMBER_JOURNEY),
        (Category::LullabyRhyme, LULLABY_RHYME),
    ]
    .into_iter()
    .flat_map(|(label, texts)| texts.iter().map(move |&text| Example::new(text, label)))
    .collect()
}
