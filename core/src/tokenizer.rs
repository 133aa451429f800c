use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str, custom: Option<&HashSet<String>>) -> bool {
    match custom {
        Some(set) => set.contains(token),
        None => STOPWORDS.contains(token),
    }
}

/// Tokenize text into lowercase alphanumeric tokens using NFKC normalization
/// and stopword removal. No stemming: weights are computed over raw surface
/// forms, so "engineer" and "engineering" stay distinct terms.
///
/// `stop_words` of `None` selects the builtin English list.
pub fn tokenize(text: &str, stop_words: Option<&HashSet<String>>) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if is_stopword(token, stop_words) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Expand surviving tokens into n-grams for every n in `min..=max`, adjacent
/// tokens joined by a single space. Stopwords were already removed, so a
/// bigram spans the gap they leave ("senior the engineer" yields
/// "senior engineer").
pub fn ngrams(tokens: &[String], min: usize, max: usize) -> Vec<String> {
    let mut terms = Vec::new();
    for n in min..=max {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
