//! German bank directory (Bankleitzahl / Kontonummer).

use crate::foundation::ServiceError;

/// Answers questions about German bank codes and account numbers.
///
/// Inputs are already format checked: codes are 8 digits, accounts 1 to 10
/// digits.
pub trait BankDirectory: Send + Sync {
    /// Whether a bank with this code exists.
    fn bank_exists(&self, bank_code: &str) -> Result<bool, ServiceError>;

    /// Whether `account` passes the check-digit method of the bank.
    fn account_valid(&self, bank_code: &str, account: &str) -> Result<bool, ServiceError>;
}

/// Fixed in-memory directory, mostly useful in tests and small deployments.
///
/// Every listed bank is assumed to accept any well-formed account number
/// unless an explicit account list was given for it.
#[derive(Debug, Clone, Default)]
pub struct StaticBankDirectory {
    banks: indexmap::IndexMap<String, Option<Vec<String>>>,
}

impl StaticBankDirectory {
    /// Empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bank that accepts every account.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_bank(mut self, bank_code: impl Into<String>) -> Self {
        self.banks.insert(bank_code.into(), None);
        self
    }

    /// Adds a bank that only knows the given accounts.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_accounts<I, S>(mut self, bank_code: impl Into<String>, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let accounts = accounts.into_iter().map(Into::into).collect();
        self.banks.insert(bank_code.into(), Some(accounts));
        self
    }
}

impl BankDirectory for StaticBankDirectory {
    fn bank_exists(&self, bank_code: &str) -> Result<bool, ServiceError> {
        Ok(self.banks.contains_key(bank_code))
    }

    fn account_valid(&self, bank_code: &str, account: &str) -> Result<bool, ServiceError> {
        Ok(match self.banks.get(bank_code) {
            None => false,
            Some(None) => true,
            Some(Some(accounts)) => {
                let account = account.trim_start_matches('0');
                accounts.iter().any(|a| a.trim_start_matches('0') == account)
            }
        })
    }
}
