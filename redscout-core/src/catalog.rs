//! Static signal and lexicon data, handed to the matcher and scorer as
//! owned configuration so tests can substitute alternate catalogs.

#[derive(Debug, Clone)]
pub struct SignalCategory {
    pub name: String,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SignalCatalog {
    categories: Vec<SignalCategory>,
}

fn category(name: &str, phrases: &[&str]) -> SignalCategory {
    SignalCategory {
        name: name.to_string(),
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
    }
}

impl SignalCatalog {
    pub fn new(categories: Vec<SignalCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[SignalCategory] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Pain-point signals: posts describing a problem worth responding to.
    /// Phrases are matched as lowercase substrings, so multi-word entries
    /// stay effective mid-sentence.
    pub fn pain_points() -> Self {
        Self::new(vec![
            category(
                "help_seeking",
                &[
                    "looking for",
                    "need help",
                    "how do i",
                    "can anyone recommend",
                    "any suggestions",
                    "any recommendations",
                    "what should i use",
                    "is there a tool",
                    "need advice",
                ],
            ),
            category(
                "frustration",
                &[
                    "frustrated",
                    "frustrating",
                    "annoying",
                    "sick of",
                    "fed up",
                    "tired of",
                    "waste of time",
                    "wasting time",
                    "doesn't work",
                    "keeps breaking",
                    "gave up on",
                ],
            ),
            category(
                "pricing",
                &[
                    "too expensive",
                    "overpriced",
                    "can't afford",
                    "cheaper alternative",
                    "price increase",
                    "pricing is",
                    "hidden fees",
                    "not worth the price",
                    "cancel my subscription",
                ],
            ),
            category(
                "feature_request",
                &[
                    "wish it had",
                    "would be great if",
                    "missing feature",
                    "feature request",
                    "if only it could",
                    "really needs",
                    "should support",
                ],
            ),
            category(
                "alternatives",
                &[
                    "alternative to",
                    "alternatives to",
                    "switching from",
                    "moving away from",
                    " vs ",
                    "compared to",
                    "better than",
                    "migrate from",
                ],
            ),
        ])
    }

    /// Opportunity signals: a narrower catalog for hiring and paid work.
    pub fn opportunities() -> Self {
        Self::new(vec![category(
            "hiring",
            &[
                "hiring",
                "looking to hire",
                "job opening",
                "paid gig",
                "freelance",
                "contract work",
                "willing to pay",
                "will pay",
                "budget of",
            ],
        )])
    }
}

/// Word lists for the sentiment scorer. Entries are single lowercase words;
/// the scorer matches them on word boundaries, unlike the substring-matched
/// signal catalog.
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub negations: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| w.to_string()).collect()
        }

        Self {
            positive: words(&[
                "love", "great", "awesome", "excellent", "amazing", "good", "best", "fantastic",
                "helpful", "perfect", "recommend", "easy", "happy", "works", "work", "solid",
                "reliable", "fast", "intuitive", "useful", "impressed", "nice",
            ]),
            negative: words(&[
                "hate", "terrible", "awful", "worst", "bad", "horrible", "broken", "bug", "bugs",
                "slow", "expensive", "frustrating", "annoying", "useless", "disappointed",
                "disappointing", "scam", "crash", "crashes", "unreliable", "confusing", "painful",
                "clunky",
            ]),
            negations: words(&[
                "not", "no", "never", "isn't", "isnt", "don't", "dont", "doesn't", "doesnt",
                "can't", "cant", "won't", "wont", "didn't", "didnt", "wasn't", "wasnt", "aren't",
                "arent", "couldn't", "couldnt", "wouldn't", "wouldnt", "hardly", "barely",
            ]),
        }
    }
}
