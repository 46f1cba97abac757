use std::borrow::Cow;
use std::fmt;

/// How a [`Locator`] finds elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Id,
    Css,
    XPath,
    ClassName,
}

/// Immutable (strategy, value) pair identifying element(s) in the DOM.
///
/// Page components keep their locators as `const` items:
///
/// ```
/// use careerprobe::Locator;
///
/// const SUBMIT: Locator = Locator::css("button[type='submit']");
/// assert_eq!(SUBMIT, Locator::css("button[type='submit']"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    value: Cow<'static, str>,
}

impl Locator {
    pub const fn id(value: &'static str) -> Self {
        Self::new_static(Strategy::Id, value)
    }

    pub const fn css(value: &'static str) -> Self {
        Self::new_static(Strategy::Css, value)
    }

    pub const fn xpath(value: &'static str) -> Self {
        Self::new_static(Strategy::XPath, value)
    }

    pub const fn class_name(value: &'static str) -> Self {
        Self::new_static(Strategy::ClassName, value)
    }

    const fn new_static(strategy: Strategy, value: &'static str) -> Self {
        Self {
            strategy,
            value: Cow::Borrowed(value),
        }
    }

    /// Build a locator from a runtime string
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: Cow::Owned(value.into()),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lower this locator onto the strategies every W3C driver supports.
    ///
    /// `Id` and `ClassName` become CSS selectors; `Css` and `XPath` pass
    /// through untouched.
    pub fn to_w3c(&self) -> (Strategy, String) {
        match self.strategy {
            Strategy::Id => (Strategy::Css, format!("[id=\"{}\"]", self.value)),
            Strategy::ClassName => (Strategy::Css, format!(".{}", self.value)),
            Strategy::Css => (Strategy::Css, self.value.to_string()),
            Strategy::XPath => (Strategy::XPath, self.value.to_string()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.strategy {
            Strategy::Id => "id",
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::ClassName => "class",
        };
        write!(f, "{} `{}`", kind, self.value)
    }
}
