//! Configuration field names shared by the built-in attribute types

/// Value used when an Instance leaves the Attribute unset
pub const DEFAULT: &str = "default";
/// Whether a value must be present
pub const MANDATORY: &str = "mandatory";
/// Minimum number of characters
pub const MIN_LENGTH: &str = "minLength";
/// Maximum number of characters
pub const MAX_LENGTH: &str = "maxLength";
/// Regular expression the whole value must match
pub const REGEX: &str = "regex";
/// Smallest allowed integer
pub const MIN_VALUE: &str = "minValue";
/// Largest allowed integer
pub const MAX_VALUE: &str = "maxValue";
/// Minimum number of uppercase characters
pub const MIN_UPPERS: &str = "minUppers";
/// Minimum number of digits
pub const MIN_NUMBERS: &str = "minNumbers";
/// Minimum number of symbols
pub const MIN_SYMBOLS: &str = "minSymbols";
/// Longest allowed run of one repeated character
pub const MAX_REPEAT: &str = "maxRepeat";
