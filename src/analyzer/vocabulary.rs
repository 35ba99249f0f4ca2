//! Fixed vocabulary tables backing the heuristic analyzer.
//!
//! All tables are matched against lowercased, suffix-stripped tokens unless
//! noted otherwise. Multi-word phrases are matched as substrings of the
//! lowercased input text.

/// Common English words dropped during tokenization.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "was", "has", "had", "this",
    "that", "with", "have", "will", "been", "from", "they", "would", "there", "their", "what",
    "about", "which", "when", "were", "than", "then", "them", "into", "also", "more", "some",
    "could", "other", "over", "such", "only", "its", "our", "may", "these", "those", "being",
    "most", "very", "after", "before", "because", "while", "where", "your", "out", "who", "how",
    "his", "her", "him", "she", "did", "does", "each", "any", "both", "between", "during",
    "through", "under", "above", "again", "once", "here", "why", "own", "same",
];

/// Suffix-stripping rules applied in order; the first matching rule wins.
/// A rule only applies when the remaining stem keeps at least three characters.
pub const SUFFIX_RULES: &[(&str, &str)] = &[("ies", "y"), ("ing", ""), ("ed", ""), ("s", "")];

/// Everyday money vocabulary.
pub const BEGINNER_TERMS: &[&str] = &[
    "money", "bank", "save", "savings", "spend", "loan", "debt", "pay", "price", "cost", "cash",
    "budget", "income", "bill", "account", "card", "buy", "sell",
];

/// Vocabulary that assumes some financial literacy.
pub const INTERMEDIATE_TERMS: &[&str] = &[
    "interest rate", "dividend", "portfolio", "inflation", "mortgage", "stock market", "bond",
    "mutual fund", "asset", "liability", "equity", "credit score", "yield", "capital gain",
    "recession", "federal reserve", "index fund", "diversification",
];

/// Specialist vocabulary that forces the advanced classification.
pub const ADVANCED_TERMS: &[&str] = &[
    "derivative", "arbitrage", "securitization", "quantitative easing", "collateralized",
    "amortization", "hedging", "leveraged buyout", "credit default swap", "tranche",
    "basis point", "duration risk", "volatility index", "short selling", "margin call",
];

/// Positive sentiment lexicon, in stemmed form.
pub const POSITIVE_WORDS: &[&str] = &[
    "gain", "profit", "growth", "rise", "surge", "rally", "improve", "strong", "record", "beat",
    "boost", "recover", "upgrade", "bullish", "outperform", "exceed",
];

/// Negative sentiment lexicon, in stemmed form.
pub const NEGATIVE_WORDS: &[&str] = &[
    "loss", "decline", "fall", "drop", "crash", "slump", "weak", "miss", "cut", "downgrade",
    "bearish", "default", "bankruptcy", "recession", "underperform", "plunge",
];

/// Maps a token-stem substring to a topic label; the first matching rule per
/// term wins.
pub const TOPIC_RULES: &[(&str, &str)] = &[
    ("rate", "Interest Rates"),
    ("interest", "Interest Rates"),
    ("fed", "Monetary Policy"),
    ("reserve", "Monetary Policy"),
    ("inflat", "Inflation"),
    ("stock", "Stock Market"),
    ("share", "Stock Market"),
    ("equit", "Stock Market"),
    ("bond", "Bonds & Fixed Income"),
    ("yield", "Bonds & Fixed Income"),
    ("dividend", "Dividends"),
    ("invest", "Investing"),
    ("portfolio", "Investing"),
    ("fund", "Investing"),
    ("loan", "Credit & Lending"),
    ("credit", "Credit & Lending"),
    ("mortgag", "Credit & Lending"),
    ("debt", "Credit & Lending"),
    ("tax", "Taxation"),
    ("budget", "Budgeting"),
    ("sav", "Saving"),
    ("crypto", "Cryptocurrency"),
    ("bitcoin", "Cryptocurrency"),
    ("bank", "Banking"),
    ("earn", "Earnings"),
    ("revenue", "Earnings"),
    ("profit", "Earnings"),
];

/// Terms whose presence alone signals high-value financial content.
/// Matched as substrings of the lowercased input text.
pub const HIGH_VALUE_TERMS: &[&str] = &[
    "interest rate", "federal reserve", "inflation", "dividend", "earnings", "portfolio",
    "mortgage", "recession", "stock market", "bond yield",
];
