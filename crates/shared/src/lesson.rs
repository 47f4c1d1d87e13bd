//! Lesson model and the bundled default curriculum.

use serde::{Deserialize, Serialize};

/// What a lesson drills. Each level has exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Letters,
    Words,
    Sentences,
}

impl std::fmt::Display for LessonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LessonKind::Letters => "letters",
            LessonKind::Words => "words",
            LessonKind::Sentences => "sentences",
        };
        write!(f, "{}", label)
    }
}

/// A single practice lesson: an ordered run of plain-text items, each typed
/// in full before advancing to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub kind: LessonKind,
    pub level: u32,
    pub items: Vec<String>,
}

/// The bundled default set served when no theme is requested. Levels climb
/// from home-row drills to full sentences.
pub fn default_lessons() -> Vec<Lesson> {
    fn lesson(kind: LessonKind, level: u32, items: &[&str]) -> Lesson {
        Lesson {
            kind,
            level,
            items: items.iter().map(|i| i.to_string()).collect(),
        }
    }

    vec![
        lesson(
            LessonKind::Letters,
            1,
            &[
                "fff jjj fjf jfj fj jf",
                "ddd kkk dkd kdk dk kd",
                "sss lll sls lsl sl ls",
                "asdf jkl asdf jkl",
            ],
        ),
        lesson(
            LessonKind::Letters,
            2,
            &[
                "ggg hhh ghg hgh gh hg",
                "rrr uuu rur uru ru ur",
                "ttt yyy tyt yty ty yt",
                "vvv mmm bnb nbn vm mv",
            ],
        ),
        lesson(
            LessonKind::Words,
            3,
            &[
                "ask sad lad fall dash",
                "glad hall flask salad",
                "that with have from they",
                "will your more when what",
            ],
        ),
        lesson(
            LessonKind::Words,
            4,
            &[
                "quick zebra oxygen jumble",
                "puzzle wizard exotic rhythm",
                "galaxy voyage subway python",
                "kayak quartz fjord sphinx",
            ],
        ),
        lesson(
            LessonKind::Sentences,
            5,
            &[
                "the quick brown fox jumps over the lazy dog",
                "pack my box with five dozen liquor jugs",
                "how vexingly quick daft zebras jump",
            ],
        ),
        lesson(
            LessonKind::Sentences,
            6,
            &[
                "sphinx of black quartz judge my vow",
                "the five boxing wizards jump quickly",
                "crazy fredrick bought many very exquisite opal jewels",
            ],
        ),
    ]
}
