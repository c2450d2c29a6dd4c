//! Argument specifications and value processing

use regex::Regex;
use std::collections::BTreeMap;

/// How a single argument value is validated.
///
/// A spec carries at most one of these; an argument without validation
/// accepts any trimmed value, including the empty string.
pub enum Validation {
    /// Arbitrary predicate over the trimmed value.
    Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
    /// Regular expression the trimmed value must match.
    Pattern(Regex),
}

type Transform = Box<dyn Fn(&str) -> String + Send + Sync>;
type Applicability = Box<dyn Fn(&ResolvedArgs) -> bool + Send + Sync>;

/// Declarative description of one configurable input.
///
/// Specs are immutable once built; the order they are declared in defines
/// the prompting and resolution order.
pub struct ArgSpec {
    name: String,
    prompt: Option<String>,
    error_template: String,
    validation: Option<Validation>,
    preprocess: Option<Transform>,
    postprocess: Option<Transform>,
    prompt_if: Option<Applicability>,
}

impl ArgSpec {
    /// Create a spec with no prompt text. Until a prompt is attached, the
    /// argument is private: it is only ever filled from supplied flags and
    /// is silently omitted when no flag is present.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            error_template: "Invalid value: '$val'.".to_string(),
            validation: None,
            preprocess: None,
            postprocess: None,
            prompt_if: None,
        }
    }

    /// Attach the interactive prompt text.
    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    /// Attach the error-message template. The literal token `$val` is
    /// replaced with the offending input when the message is rendered.
    pub fn error(mut self, template: impl Into<String>) -> Self {
        self.error_template = template.into();
        self
    }

    /// Validate values against a regular expression.
    ///
    /// Panics if the pattern does not compile; patterns are part of the
    /// static argument table of each CLI.
    pub fn pattern(mut self, pattern: &str) -> Self {
        let re = Regex::new(pattern).expect("argument pattern must compile");
        self.validation = Some(Validation::Pattern(re));
        self
    }

    /// Validate values with a predicate function.
    pub fn predicate(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validation = Some(Validation::Predicate(Box::new(f)));
        self
    }

    /// Transform the raw input before trimming and validation.
    pub fn preprocess(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.preprocess = Some(Box::new(f));
        self
    }

    /// Transform the validated value before it is stored.
    pub fn postprocess(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.postprocess = Some(Box::new(f));
        self
    }

    /// Only resolve this argument when the predicate holds over the
    /// arguments resolved so far. Arguments not resolved yet read as absent.
    pub fn prompt_if(mut self, f: impl Fn(&ResolvedArgs) -> bool + Send + Sync + 'static) -> Self {
        self.prompt_if = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// A spec without prompt text is a private, flags-only parameter.
    pub fn is_hidden(&self) -> bool {
        self.prompt.is_none()
    }

    /// Whether this argument applies given the arguments resolved so far.
    pub fn applies(&self, resolved: &ResolvedArgs) -> bool {
        match &self.prompt_if {
            Some(f) => f(resolved),
            None => true,
        }
    }

    /// Process one attempted value: preprocess, trim, validate, postprocess.
    pub fn evaluate(&self, raw: &str) -> Outcome {
        let value = match &self.preprocess {
            Some(f) => f(raw),
            None => raw.to_string(),
        };
        let value = value.trim().to_string();

        let valid = match &self.validation {
            None => true,
            Some(Validation::Predicate(f)) => f(&value),
            Some(Validation::Pattern(re)) => re.is_match(&value),
        };
        if !valid {
            return Outcome::Rejected(self.error_template.replace("$val", &value));
        }

        let value = match &self.postprocess {
            Some(f) => f(&value),
            None => value,
        };
        Outcome::Accepted(value)
    }
}

/// Result of processing one attempted value for an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Final (post-processed) value.
    Accepted(String),
    /// Rendered error message, ready to display.
    Rejected(String),
}

/// Arguments resolved so far, keyed by spec name.
///
/// Built incrementally during a single resolution pass; a missing key means
/// "not applicable", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArgs {
    values: BTreeMap<String, String>,
}

impl ResolvedArgs {
    pub(crate) fn insert(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value of `name`, where an absent key reads as the empty string.
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
