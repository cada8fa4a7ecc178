use url::Url;

use crate::error::ClientError;

pub const DEFAULT_PHONE: &str = "27721423215";
pub const DEFAULT_MESSAGE: &str =
    "Hi SynthAI, I would like to get more information about your services.";

const WA_ME_BASE: &str = "https://wa.me/";

/// `https://wa.me/<digits>?text=<message>` with the message form-encoded.
/// Anything in `phone` that is not a digit (`+`, spaces, dashes) is dropped.
pub fn whatsapp_link(phone: &str, message: &str) -> Result<Url, ClientError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let mut url = Url::parse(WA_ME_BASE)?.join(&digits)?;
    if !message.is_empty() {
        url.query_pairs_mut().append_pair("text", message);
    }
    Ok(url)
}
