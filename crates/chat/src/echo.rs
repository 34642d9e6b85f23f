use crate::colour::Colour;
use std::borrow::Cow;
use std::fmt;

/// Text to show in the local chat window instead of the received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalChat {
    pub colour: Option<Colour>,
    pub text: String,
}

impl LocalChat {
    pub fn new(colour: Option<Colour>, text: impl Into<String>) -> Self {
        Self {
            colour,
            text: text.into(),
        }
    }
}

/// Renders with a leading `§x` code when coloured.
impl fmt::Display for LocalChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.colour {
            Some(colour) => write!(f, "{colour}{}", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// How a dispatched line should appear locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Echo {
    /// Show the received line unchanged
    Verbatim,
    /// Show this text instead
    Replace(LocalChat),
}

impl Echo {
    /// Text to display, given the line as received.
    pub fn render<'a>(&'a self, original: &'a str) -> Cow<'a, str> {
        match self {
            Self::Verbatim => Cow::Borrowed(original),
            Self::Replace(chat) => Cow::Owned(chat.to_string()),
        }
    }

    pub fn is_verbatim(&self) -> bool {
        matches!(self, Self::Verbatim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_replacement_with_colour_code() {
        let echo = Echo::Replace(LocalChat::new(Some(Colour::Gold), "(1) hi"));
        assert_eq!(echo.render("ignored"), "\u{a7}6(1) hi");
        assert_eq!(Echo::Verbatim.render("as is"), "as is");
        assert_eq!(LocalChat::new(None, "plain").to_string(), "plain");
    }
}
