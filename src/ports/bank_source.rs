use crate::domain::AppError;

/// Port for obtaining the raw concept bank document.
pub trait BankSource {
    /// Read the bank document as JSON text.
    fn read_bank(&self) -> Result<String, AppError>;

    /// Human-readable origin, used in error messages.
    fn describe(&self) -> String;
}
