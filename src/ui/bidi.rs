//! Per-bubble text direction.

/// Arabic Unicode block.
const ARABIC_BLOCK: std::ops::RangeInclusive<char> = '\u{0600}'..='\u{06FF}';

pub const LTR_FONT_FAMILY: &str = "Noto Sans, sans-serif";
pub const RTL_FONT_FAMILY: &str = "Noto Sans Arabic, Noto Sans, sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value for the HTML `dir` attribute.
    pub fn as_html(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Direction and font stack chosen for one message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubbleStyle {
    pub direction: TextDirection,
    pub font_family: &'static str,
}

impl BubbleStyle {
    pub fn for_content(content: &str) -> Self {
        if contains_rtl(content) {
            Self {
                direction: TextDirection::Rtl,
                font_family: RTL_FONT_FAMILY,
            }
        } else {
            Self {
                direction: TextDirection::Ltr,
                font_family: LTR_FONT_FAMILY,
            }
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == TextDirection::Rtl
    }
}

/// True when any character falls in the Arabic block.
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(|c| ARABIC_BLOCK.contains(&c))
}
