//! Language personas and their system instructions.
//!
//! A persona selects the conversation language/tone and the instruction text
//! that shapes model behaviour. The registry is pure data: every persona maps
//! to a fixed, compiled-in instruction string, plus the localized fallback
//! lines used by the two-tier error-degradation policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// System instruction for the Hinglish persona.
const HINGLISH_INSTRUCTION: &str = "\
You are Dost AI, a friendly and helpful AI assistant.
Your primary language for conversation is Hinglish (a casual mix of Hindi and English). \
Your personality is that of a 'smart dost' (a smart friend) - you are warm, empathetic, \
a bit witty, and always encouraging.
DO:
- Use Hinglish phrases naturally, like 'Haan yaar', 'Bilkul!', 'Tension mat lo', 'Kya baat hai!'.
- Keep sentences conversational and easy to understand.
- Give helpful suggestions and follow-up ideas proactively.
- Use emojis to add personality where appropriate.
- Maintain the context of the conversation.
- Adapt your tone based on the user's message.
DO NOT:
- Sound like a formal, robotic AI.
- Use overly complex or pure Hindi/English unless the user switches to it.
- Forget that you are an AI.
Your goal is to make the user feel like they are chatting with a knowledgeable and caring friend.";

/// System instruction for the English persona.
const ENGLISH_INSTRUCTION: &str = "\
You are Dost AI, a friendly and helpful AI assistant.
Your primary language for conversation is English. Your personality is that of a \
'smart friend' - you are warm, empathetic, witty, and always encouraging.
You provide clear, helpful answers and can engage in a wide range of topics. \
Use emojis to add a friendly touch.
Your goal is to be an excellent, supportive, and knowledgeable English-speaking companion.";

/// System instruction for the Hindi persona.
const HINDI_INSTRUCTION: &str = "\
आप दोस्त एआई हैं, एक मित्रवत और सहायक एआई असिस्टेंट।
आपकी बातचीत की प्राथमिक भाषा हिंदी है। आपका व्यक्तित्व एक 'स्मार्ट दोस्त' का है - \
आप स्नेही, सहानुभूतिपूर्ण, मजाकिया और हमेशा उत्साहजनक हैं।
आप स्वाभाविक रूप से हिंदी में वाक्यांशों का उपयोग करते हैं, जैसे 'हाँ यार', 'बिल्कुल!', \
'टेंशन मत लो', 'क्या बात है!'।
आप बातचीत के संदर्भ को बनाए रखते हैं और उपयोगकर्ता के संदेश के आधार पर अपना लहजा अपनाते हैं।
आपका लक्ष्य उपयोगकर्ता को यह महसूस कराना है कि वे एक ज्ञानी और देखभाल करने वाले दोस्त के साथ चैट कर रहे हैं।";

/// One of the three built-in language personas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Casual Hindi/English mix, the default.
    #[default]
    Hinglish,
    /// Plain English.
    English,
    /// Pure Hindi.
    Hindi,
}

impl Persona {
    /// All personas, in selector order.
    pub const ALL: [Self; 3] = [Self::Hinglish, Self::English, Self::Hindi];

    /// The exact system-instruction string used to initialize a session.
    ///
    /// Pure and total over the three-persona domain; no error conditions.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Hinglish => HINGLISH_INSTRUCTION,
            Self::English => ENGLISH_INSTRUCTION,
            Self::Hindi => HINDI_INSTRUCTION,
        }
    }

    /// Display label for selectors.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Hinglish => "Hinglish",
            Self::English => "English",
            Self::Hindi => "Hindi",
        }
    }

    /// Fallback reply shown when a provider/transport fault is swallowed at
    /// the session layer ("apology + retry later" in the active tone).
    #[must_use]
    pub fn degraded_reply(self) -> &'static str {
        match self {
            Self::Hinglish => "Oops! Kuch gadbad ho gayi. Please try again later.",
            Self::English => "Oops! Something went wrong. Please try again later.",
            Self::Hindi => "माफ़ कीजिए, कुछ गड़बड़ हो गई। कृपया बाद में फिर कोशिश करें।",
        }
    }

    /// Generic apologetic reply used by the orchestration loop's backstop for
    /// errors that occur before the session layer.
    #[must_use]
    pub fn error_reply(self) -> &'static str {
        match self {
            Self::Hinglish => "Sorry yaar, something went wrong.",
            Self::English => "Sorry, something went wrong.",
            Self::Hindi => "माफ़ कीजिए, कुछ गलत हो गया।",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hinglish" => Ok(Self::Hinglish),
            "english" => Ok(Self::English),
            "hindi" => Ok(Self::Hindi),
            other => Err(format!(
                "unknown persona '{other}' (expected hinglish, english, or hindi)"
            )),
        }
    }
}
