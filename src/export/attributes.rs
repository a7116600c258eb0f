//! Attribute sentiment resolution for flattened exports.

use std::collections::BTreeSet;

use serde_json::Value;

/// Attributes that get a dedicated `attribute_<Name>` column.
pub const PREDEFINED_ATTRIBUTES: [&str; 9] = [
    "Composition",
    "Efficiency",
    "Packaging",
    "Price",
    "Quality",
    "Safety",
    "Scent",
    "Taste",
    "Texture",
];

/// Attributes folded into the composite `safety` column.
const SAFETY_ATTRIBUTES: [&str; 2] = ["Safety", "Composition"];

/// Sentiment of one attribute within one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    /// Not mentioned.
    Absent,
    /// Mentioned positively only.
    Positive,
    /// Mentioned negatively only.
    Negative,
    /// Mentioned both ways, or mentioned without sentiment.
    Neutral,
}

impl Sentiment {
    /// Resolves the sentiment from list membership.
    #[must_use]
    pub const fn resolve(mentioned: bool, positive: bool, negative: bool) -> Self {
        match (positive, negative) {
            (true, true) => Self::Neutral,
            (true, false) => Self::Positive,
            (false, true) => Self::Negative,
            (false, false) if mentioned => Self::Neutral,
            (false, false) => Self::Absent,
        }
    }

    /// Cell value written to the export table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Absent => "0",
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutre",
        }
    }
}

/// Predefined attributes mentioned by one review, split by sentiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMentions {
    all: BTreeSet<&'static str>,
    positive: BTreeSet<&'static str>,
    negative: BTreeSet<&'static str>,
}

impl AttributeMentions {
    /// Reads the three attribute lists of a review.
    ///
    /// Values that are not a list, or a string holding a list literal, count
    /// as empty.
    #[must_use]
    pub fn from_values(
        all: Option<&Value>,
        positive: Option<&Value>,
        negative: Option<&Value>,
    ) -> Self {
        Self {
            all: predefined(all),
            positive: predefined(positive),
            negative: predefined(negative),
        }
    }

    /// Sentiment of a single attribute.
    #[must_use]
    pub fn sentiment(&self, attribute: &str) -> Sentiment {
        Sentiment::resolve(
            self.all.contains(attribute),
            self.positive.contains(attribute),
            self.negative.contains(attribute),
        )
    }

    /// Composite sentiment over Safety and Composition.
    ///
    /// Implicit neutrality counts only for attributes absent from both
    /// sentiment lists.
    #[must_use]
    pub fn safety(&self) -> Sentiment {
        let positive = SAFETY_ATTRIBUTES
            .iter()
            .any(|attr| self.positive.contains(attr));
        let negative = SAFETY_ATTRIBUTES
            .iter()
            .any(|attr| self.negative.contains(attr));
        let implicit = SAFETY_ATTRIBUTES.iter().any(|attr| {
            self.all.contains(attr) && !self.positive.contains(attr) && !self.negative.contains(attr)
        });
        Sentiment::resolve(implicit, positive, negative)
    }
}

fn predefined(value: Option<&Value>) -> BTreeSet<&'static str> {
    let names = value.map(parse_attribute_list).unwrap_or_default();
    PREDEFINED_ATTRIBUTES
        .into_iter()
        .filter(|attr| names.iter().any(|name| name == attr))
        .collect()
}

/// Parses an attribute list from a JSON array or a list literal string such
/// as `"['Price', 'Scent']"`. Anything malformed yields an empty list.
#[must_use]
pub fn parse_attribute_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        Value::String(text) => parse_list_literal(text).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
        return Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
        );
    }
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(quote) = chars.next() else {
            return Some(items);
        };
        if quote != '\'' && quote != '"' {
            return None;
        }
        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(chars.next()?),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => return Some(items),
            Some(',') => {}
            Some(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!(["Price", "Scent"]), vec!["Price", "Scent"])]
    #[case(json!("['Price', 'Scent']"), vec!["Price", "Scent"])]
    #[case(json!("[\"Quality\"]"), vec!["Quality"])]
    #[case(json!("[ 'It\\'s', \"x\" , ]"), vec!["It's", "x"])]
    #[case(json!("[]"), Vec::<&str>::new())]
    #[case(json!("['Price'"), Vec::<&str>::new())]
    #[case(json!("Price, Scent"), Vec::<&str>::new())]
    #[case(json!("['Price' 'Scent']"), Vec::<&str>::new())]
    #[case(json!(null), Vec::<&str>::new())]
    #[case(json!(3), Vec::<&str>::new())]
    fn parses_lists_and_swallows_malformed_input(
        #[case] value: Value,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(parse_attribute_list(&value), expected);
    }

    #[rstest]
    #[case(true, true, true, Sentiment::Neutral)]
    #[case(false, true, true, Sentiment::Neutral)]
    #[case(true, true, false, Sentiment::Positive)]
    #[case(false, false, true, Sentiment::Negative)]
    #[case(true, false, false, Sentiment::Neutral)]
    #[case(false, false, false, Sentiment::Absent)]
    fn resolution_rule(
        #[case] mentioned: bool,
        #[case] positive: bool,
        #[case] negative: bool,
        #[case] expected: Sentiment,
    ) {
        assert_eq!(Sentiment::resolve(mentioned, positive, negative), expected);
    }

    #[rstest]
    fn unknown_attributes_are_ignored() {
        let mentions = AttributeMentions::from_values(
            Some(&json!(["Price", "Sparkle"])),
            Some(&json!(["Sparkle"])),
            None,
        );
        assert_eq!(mentions.sentiment("Price"), Sentiment::Neutral);
        assert_eq!(mentions.sentiment("Sparkle"), Sentiment::Absent);
    }

    #[rstest]
    #[case(json!(["Safety"]), json!(["Composition"]), json!([]), Sentiment::Positive)]
    #[case(json!([]), json!(["Safety"]), json!(["Composition"]), Sentiment::Neutral)]
    #[case(json!([]), json!([]), json!(["Composition"]), Sentiment::Negative)]
    #[case(json!(["Composition"]), json!([]), json!([]), Sentiment::Neutral)]
    #[case(json!(["Price"]), json!(["Price"]), json!([]), Sentiment::Absent)]
    fn safety_combines_safety_and_composition(
        #[case] all: Value,
        #[case] positive: Value,
        #[case] negative: Value,
        #[case] expected: Sentiment,
    ) {
        let mentions = AttributeMentions::from_values(Some(&all), Some(&positive), Some(&negative));
        assert_eq!(mentions.safety(), expected);
    }
}
