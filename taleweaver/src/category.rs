use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::errors::TaleweaverError;

/// Story category.
///
/// The declaration order is the priority order used to break exact ties between categories
/// during prediction: the earlier variant wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub enum Category {
    /// Quests, dragons, castles and faraway lands.
    FantasyAdventure,

    /// Stories that teach a lesson such as honesty or kindness.
    MoralQuest,

    /// Counting stories.
    NumberJourney,

    /// Gentle rhymes and lullabies for falling asleep.
    LullabyRhyme,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Self; 4] = [
        Self::FantasyAdventure,
        Self::MoralQuest,
        Self::NumberJourney,
        Self::LullabyRhyme,
    ];

    /// Gets the identifier of the category, e.g., `number_journey`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FantasyAdventure => "fantasy_adventure",
            Self::MoralQuest => "moral_quest",
            Self::NumberJourney => "number_journey",
            Self::LullabyRhyme => "lullaby_rhyme",
        }
    }

    /// Gets the human-readable theme name, e.g., `Number Journey`.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::FantasyAdventure => "Fantasy Adventure",
            Self::MoralQuest => "Moral Quest",
            Self::NumberJourney => "Number Journey",
            Self::LullabyRhyme => "Lullaby Rhyme",
        }
    }

    /// Gets the narrative arc used for this category.
    pub const fn arc(self) -> Arc {
        match self {
            Self::FantasyAdventure => Arc::ThreeAct,
            Self::MoralQuest => Arc::ProblemResolution,
            Self::NumberJourney => Arc::Cumulative,
            Self::LullabyRhyme => Arc::RhymeScheme,
        }
    }

    pub(crate) const fn priority(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TaleweaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                TaleweaverError::invalid_argument("category", format!("unknown category: {s}"))
            })
    }
}

/// Narrative structure of a story.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Arc {
    /// Setup, confrontation and resolution.
    #[default]
    ThreeAct,

    /// A problem is introduced and then solved.
    ProblemResolution,

    /// Each step repeats and extends the previous one.
    Cumulative,

    /// Structured around a rhyme scheme.
    RhymeScheme,
}

impl Arc {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThreeAct => "ThreeAct",
            Self::ProblemResolution => "ProblemResolution",
            Self::Cumulative => "Cumulative",
            Self::RhymeScheme => "RhymeScheme",
        }
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects a narrative arc for a category identifier.
///
/// This function never fails: identifiers outside the known categories fall back to
/// [`Arc::ThreeAct`].
///
/// # Examples
///
/// ```
/// use taleweaver::{select_arc, Arc};
///
/// assert_eq!(Arc::Cumulative, select_arc("number_journey"));
/// assert_eq!(Arc::ThreeAct, select_arc("space_opera"));
/// ```
pub fn select_arc(category: &str) -> Arc {
    category
        .parse::<Category>()
        .map_or_else(|_| Arc::default(), Category::arc)
}
