use std::fmt;
use std::str::FromStr;

use crate::utils::error::TranslatorError;

macro_rules! target_languages {
    ($($variant:ident => $code:literal, $name:literal;)+) => {
        /// Target languages accepted by the document translation endpoint.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TargetLanguage {
            $($variant,)+
        }

        impl TargetLanguage {
            pub const ALL: &'static [TargetLanguage] = &[$(TargetLanguage::$variant,)+];

            pub fn code(self) -> &'static str {
                match self {
                    $(TargetLanguage::$variant => $code,)+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(TargetLanguage::$variant => $name,)+
                }
            }
        }
    };
}

target_languages! {
    Bg => "BG", "Bulgarian";
    Cs => "CS", "Czech";
    Da => "DA", "Danish";
    De => "DE", "German";
    El => "EL", "Greek";
    EnGb => "EN-GB", "English (British)";
    EnUs => "EN-US", "English (American)";
    Es => "ES", "Spanish";
    Et => "ET", "Estonian";
    Fi => "FI", "Finnish";
    Fr => "FR", "French";
    Hu => "HU", "Hungarian";
    Id => "ID", "Indonesian";
    It => "IT", "Italian";
    Ja => "JA", "Japanese";
    Ko => "KO", "Korean";
    Lt => "LT", "Lithuanian";
    Lv => "LV", "Latvian";
    Nb => "NB", "Norwegian (Bokmål)";
    Nl => "NL", "Dutch";
    Pl => "PL", "Polish";
    PtBr => "PT-BR", "Portuguese (Brazilian)";
    PtPt => "PT-PT", "Portuguese (European)";
    Ro => "RO", "Romanian";
    Ru => "RU", "Russian";
    Sk => "SK", "Slovak";
    Sl => "SL", "Slovenian";
    Sv => "SV", "Swedish";
    Tr => "TR", "Turkish";
    Uk => "UK", "Ukrainian";
    Zh => "ZH", "Chinese (simplified)";
}

impl Default for TargetLanguage {
    fn default() -> Self {
        TargetLanguage::EnUs
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TargetLanguage {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TargetLanguage::ALL
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TranslatorError::InvalidConfigValueError {
                field: "target_language".to_string(),
                value: s.to_string(),
                reason: "Unsupported target language code".to_string(),
            })
    }
}
