use crate::validation::{self, ValidationErrors, MAX_STRING_LENGTH};
use chrono::NaiveDate;
use finance_repo::transaction_repo::{NewTransaction, TransactionType, TransactionUpdate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

const ALLOWED_TYPES: [&str; 2] = ["earning", "expense"];

/// Request body for creating and updating transactions. Anything not listed here (`user_id`,
/// `id`, timestamps) is ignored.
#[derive(Deserialize, Default)]
pub struct TransactionPayload {
    name: Option<Value>,
    #[serde(rename = "type")]
    transaction_type: Option<Value>,
    amount: Option<Value>,
    date: Option<Value>,
    description: Option<Value>,
}

pub struct ValidTransaction {
    pub name: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl TransactionPayload {
    pub fn validate(&self) -> Result<ValidTransaction, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = validation::required_string("name", self.name.as_ref(), MAX_STRING_LENGTH);
        let transaction_type = validation::one_of::<TransactionType>(
            "type",
            self.transaction_type.as_ref(),
            &ALLOWED_TYPES,
        );
        let amount = validation::numeric("amount", self.amount.as_ref());
        let date = validation::date("date", self.date.as_ref());
        let description = validation::optional_string("description", self.description.as_ref());

        errors.collect("name", &name);
        errors.collect("type", &transaction_type);
        errors.collect("amount", &amount);
        errors.collect("date", &date);
        errors.collect("description", &description);

        match (name, transaction_type, amount, date, description) {
            (Ok(name), Ok(transaction_type), Ok(amount), Ok(date), Ok(description)) => {
                Ok(ValidTransaction {
                    name,
                    transaction_type,
                    amount,
                    date,
                    description,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<ValidTransaction> for NewTransaction {
    fn from(value: ValidTransaction) -> Self {
        NewTransaction::new(
            value.name,
            value.transaction_type,
            value.amount,
            value.date,
            value.description,
        )
    }
}

impl From<ValidTransaction> for TransactionUpdate {
    fn from(value: ValidTransaction) -> Self {
        TransactionUpdate {
            name: value.name,
            transaction_type: value.transaction_type,
            amount: value.amount,
            date: value.date,
            description: value.description,
        }
    }
}
