//! Quote widget: a fixed set of quotes, one picked at random per page load.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

impl Quote {
    /// Display form: the quoted text, then `- author` on its own line.
    pub fn display(&self) -> String {
        format!("\"{}\"\n- {}", self.text, self.author)
    }
}

pub const QUOTES: [Quote; 5] = [
    Quote {
        text: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    Quote {
        text: "Innovation distinguishes between a leader and a follower.",
        author: "Steve Jobs",
    },
    Quote {
        text: "Code is like humor. When you have to explain it, it is bad.",
        author: "Cory House",
    },
    Quote {
        text: "Simplicity is the soul of efficiency.",
        author: "Austin Freeman",
    },
    Quote {
        text: "First, solve the problem. Then, write the code.",
        author: "John Johnson",
    },
];

pub fn random_quote<R: Rng>(rng: &mut R) -> Quote {
    QUOTES[rng.gen_range(0..QUOTES.len())]
}
