/// No color is left to choose: every palette color is held by a player or
/// has been refused by the server this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoSafeColorError;

impl std::error::Error for NoSafeColorError {}

impl std::fmt::Display for NoSafeColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "There is no safe color left to choose this turn")
    }
}
