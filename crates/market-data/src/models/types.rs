use std::borrow::Cow;
use std::sync::Arc;

/// Terminal identifier - mostly static constants
pub type TerminalId = Cow<'static, str>;

/// Vendor-native code string discovered at runtime
pub type VendorSymbol = Arc<str>;
