use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CompanyName, ContactName, CreditCode, CustomerEmail, CustomerKey, PhoneNumber, Remarks,
    TypeConstraintError, WebsiteUrl,
};

/// Generates a string-backed attribute enum with a display label per variant.
///
/// Values the client does not know decode to `Unknown` so a single odd row
/// cannot fail a whole page.
macro_rules! labelled_enum {
    ($name:ident, $default:ident, $doc:expr, { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
            #[serde(other)]
            Unknown,
        }

        impl $name {
            /// Value used on the wire and in query filters.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown => "unknown",
                }
            }

            /// Human-readable label for list rendering.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Unknown => "Unknown",
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(other.to_string())),
                }
            }
        }
    };
}

labelled_enum!(CustomerStatus, Active, "Relationship status of a customer.", {
    Active => ("active", "Active"),
    Inactive => ("inactive", "Inactive"),
    Potential => ("potential", "Potential"),
});

labelled_enum!(CustomerLevel, Standard, "Service tier assigned to a customer.", {
    Vip => ("vip", "VIP"),
    Standard => ("standard", "Standard"),
    Economy => ("economy", "Economy"),
});

labelled_enum!(CustomerType, Enterprise, "Legal form of a customer.", {
    Enterprise => ("enterprise", "Enterprise"),
    Individual => ("individual", "Individual"),
});

labelled_enum!(CustomerSource, Direct, "Acquisition channel of a customer.", {
    Direct => ("direct", "Direct"),
    Referral => ("referral", "Referral"),
    Marketing => ("marketing", "Marketing"),
});

/// Customer record as returned by the remote collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: i64,
    #[serde(rename = "customer_id")]
    pub key: CustomerKey,
    pub company_name: String,
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(default)]
    pub credit_code: Option<String>,
    #[serde(default)]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub erp_system: Option<String>,
    #[serde(default)]
    pub erp_customer_code: Option<String>,
    #[serde(default)]
    pub status: CustomerStatus,
    #[serde(default)]
    pub level: CustomerLevel,
    #[serde(default)]
    pub source: CustomerSource,
    #[serde(default)]
    pub remarks: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated payload for creating a customer.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewCustomer {
    pub company_name: CompanyName,
    pub contact_name: ContactName,
    pub contact_phone: PhoneNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_code: Option<CreditCode>,
    pub customer_type: CustomerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<CustomerEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erp_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erp_customer_code: Option<String>,
    pub status: CustomerStatus,
    pub level: CustomerLevel,
    pub source: CustomerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Remarks>,
}

impl NewCustomer {
    /// Builds a payload with the required fields and backend defaults for the rest.
    #[must_use]
    pub fn new(
        company_name: CompanyName,
        contact_name: ContactName,
        contact_phone: PhoneNumber,
    ) -> Self {
        Self {
            company_name,
            contact_name,
            contact_phone,
            credit_code: None,
            customer_type: CustomerType::default(),
            province: None,
            city: None,
            address: None,
            email: None,
            website: None,
            industry: None,
            erp_system: None,
            erp_customer_code: None,
            status: CustomerStatus::default(),
            level: CustomerLevel::default(),
            source: CustomerSource::default(),
            remarks: None,
        }
    }
}

/// Partial update; only the provided fields are sent.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<CompanyName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<ContactName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_code: Option<CreditCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<CustomerEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<WebsiteUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erp_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub erp_customer_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CustomerLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CustomerSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Remarks>,
}

impl UpdateCustomer {
    /// Returns `true` when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
