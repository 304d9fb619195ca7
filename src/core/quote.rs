/// A motivational quote shown on the home screen carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub id: u32,
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote {
        id: 1,
        text: "Laziness casts one into a deep sleep, and an idle person will suffer hunger.",
        author: "The Bible (Proverbs 19:15)",
    },
    Quote {
        id: 2,
        text: "Do not love sleep, lest you come to poverty; Open you eyes, and you will be satisfied with bread",
        author: "The Bible (Proverbs 20:13)",
    },
    Quote {
        id: 3,
        text: "A little sleep, a little slumber, A little folding of the hands to sleep — So shall your poverty come on you like a prowler, And your need like an armed man.",
        author: "The Bible (Proverbs 6:10-11)",
    },
    Quote {
        id: 4,
        text: "For even when we were with you, we commanded you this: If anyone will not work, neither shall he eat.",
        author: "The Bible (2 Thessalonians 3:10)",
    },
];

/// Cyclic accessor for carousel rotation; any index maps onto the list.
pub fn quote_at(index: usize) -> &'static Quote {
    &QUOTES[index % QUOTES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps() {
        assert_eq!(quote_at(0).id, 1);
        assert_eq!(quote_at(QUOTES.len()).id, 1);
        assert_eq!(quote_at(QUOTES.len() + 2).id, 3);
    }
}
