//! Customer input forms validated before any request is made.

use serde::Deserialize;
use validator::Validate;

use crate::domain::customer::{
    CustomerLevel, CustomerSource, CustomerStatus, CustomerType, NewCustomer, UpdateCustomer,
};
use crate::domain::types::{
    CompanyName, ContactName, CreditCode, CustomerEmail, PhoneNumber, Remarks, WebsiteUrl,
};
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize, Validate)]
/// Form data for creating a customer.
pub struct CustomerForm {
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 100))]
    pub contact_name: String,
    pub contact_phone: String,
    #[serde(default)]
    pub credit_code: Option<String>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub province: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub erp_system: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub erp_customer_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Form data for editing a customer; blank fields are left unchanged.
pub struct CustomerPatchForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub credit_code: Option<String>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub province: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub industry: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub erp_system: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub erp_customer_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Trimmed value, or `None` when the field was left blank.
fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: &Option<String>) -> Option<String> {
    filled(value).map(str::to_string)
}

/// Parses an optional field with `parse`, mapping failures to `error`.
fn parse_opt<T, E>(
    value: &Option<String>,
    parse: impl FnOnce(&str) -> Result<T, E>,
    error: FormError,
) -> Result<Option<T>, FormError> {
    filled(value)
        .map(|v| parse(v).map_err(|_| error))
        .transpose()
}

impl TryFrom<CustomerForm> for NewCustomer {
    type Error = FormError;

    fn try_from(form: CustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let company_name =
            CompanyName::new(form.company_name.as_str()).map_err(|_| FormError::InvalidName)?;
        let contact_name =
            ContactName::new(form.contact_name.as_str()).map_err(|_| FormError::InvalidName)?;
        let contact_phone = PhoneNumber::new(form.contact_phone.as_str())
            .map_err(|_| FormError::InvalidPhoneNumber)?;

        let mut customer = NewCustomer::new(company_name, contact_name, contact_phone);
        customer.credit_code = parse_opt(
            &form.credit_code,
            |v| CreditCode::new(v),
            FormError::InvalidCreditCode,
        )?;
        customer.email =
            parse_opt(&form.email, |v| CustomerEmail::new(v), FormError::InvalidEmail)?;
        customer.website =
            parse_opt(&form.website, |v| WebsiteUrl::new(v), FormError::InvalidUrl)?;
        customer.remarks =
            parse_opt(&form.remarks, |v| Remarks::new(v), FormError::InvalidRemarks)?;
        customer.province = owned(&form.province);
        customer.city = owned(&form.city);
        customer.address = owned(&form.address);
        customer.industry = owned(&form.industry);
        customer.erp_system = owned(&form.erp_system);
        customer.erp_customer_code = owned(&form.erp_customer_code);

        if let Some(value) = parse_opt(
            &form.customer_type,
            str::parse::<CustomerType>,
            FormError::InvalidChoice("customer_type"),
        )? {
            customer.customer_type = value;
        }
        if let Some(value) = parse_opt(
            &form.status,
            str::parse::<CustomerStatus>,
            FormError::InvalidChoice("status"),
        )? {
            customer.status = value;
        }
        if let Some(value) = parse_opt(
            &form.level,
            str::parse::<CustomerLevel>,
            FormError::InvalidChoice("level"),
        )? {
            customer.level = value;
        }
        if let Some(value) = parse_opt(
            &form.source,
            str::parse::<CustomerSource>,
            FormError::InvalidChoice("source"),
        )? {
            customer.source = value;
        }

        Ok(customer)
    }
}

impl TryFrom<CustomerPatchForm> for UpdateCustomer {
    type Error = FormError;

    fn try_from(form: CustomerPatchForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let update = UpdateCustomer {
            company_name: parse_opt(
                &form.company_name,
                |v| CompanyName::new(v),
                FormError::InvalidName,
            )?,
            contact_name: parse_opt(
                &form.contact_name,
                |v| ContactName::new(v),
                FormError::InvalidName,
            )?,
            contact_phone: parse_opt(
                &form.contact_phone,
                |v| PhoneNumber::new(v),
                FormError::InvalidPhoneNumber,
            )?,
            credit_code: parse_opt(
                &form.credit_code,
                |v| CreditCode::new(v),
                FormError::InvalidCreditCode,
            )?,
            customer_type: parse_opt(
                &form.customer_type,
                str::parse::<CustomerType>,
                FormError::InvalidChoice("customer_type"),
            )?,
            province: owned(&form.province),
            city: owned(&form.city),
            address: owned(&form.address),
            email: parse_opt(&form.email, |v| CustomerEmail::new(v), FormError::InvalidEmail)?,
            website: parse_opt(&form.website, |v| WebsiteUrl::new(v), FormError::InvalidUrl)?,
            industry: owned(&form.industry),
            erp_system: owned(&form.erp_system),
            erp_customer_code: owned(&form.erp_customer_code),
            status: parse_opt(
                &form.status,
                str::parse::<CustomerStatus>,
                FormError::InvalidChoice("status"),
            )?,
            level: parse_opt(
                &form.level,
                str::parse::<CustomerLevel>,
                FormError::InvalidChoice("level"),
            )?,
            source: parse_opt(
                &form.source,
                str::parse::<CustomerSource>,
                FormError::InvalidChoice("source"),
            )?,
            remarks: parse_opt(&form.remarks, |v| Remarks::new(v), FormError::InvalidRemarks)?,
        };

        if update.is_empty() {
            return Err(FormError::NothingToUpdate);
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CustomerForm {
        CustomerForm {
            company_name: "Acme Corp".to_string(),
            contact_name: "Jane Doe".to_string(),
            contact_phone: "+86 138-0013-8000".to_string(),
            ..Default::default()
        }
    }

    /// Fills backend defaults for omitted optional fields.
    #[test]
    fn minimal_form_converts_with_defaults() {
        let customer = NewCustomer::try_from(valid_form()).expect("valid form");

        assert_eq!(customer.company_name.as_str(), "Acme Corp");
        assert_eq!(customer.status, CustomerStatus::Active);
        assert_eq!(customer.level, CustomerLevel::Standard);
        assert!(customer.email.is_none());
    }

    /// Treats blank optional inputs as missing.
    #[test]
    fn blank_optionals_are_ignored() {
        let form = CustomerForm {
            email: Some("   ".to_string()),
            website: Some(String::new()),
            province: Some(" Guangdong ".to_string()),
            ..valid_form()
        };

        let customer = NewCustomer::try_from(form).expect("valid form");

        assert!(customer.email.is_none());
        assert!(customer.website.is_none());
        assert_eq!(customer.province.as_deref(), Some("Guangdong"));
    }

    #[test]
    fn rejects_short_phone_number() {
        let form = CustomerForm {
            contact_phone: "12-34".to_string(),
            ..valid_form()
        };

        let result = NewCustomer::try_from(form);

        assert!(matches!(result, Err(FormError::InvalidPhoneNumber)));
    }

    #[test]
    fn rejects_overlong_company_name() {
        let form = CustomerForm {
            company_name: "x".repeat(201),
            ..valid_form()
        };

        assert!(matches!(
            NewCustomer::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    /// Upper-cases credit codes and parses enumerated choices.
    #[test]
    fn parses_credit_code_and_choices() {
        let form = CustomerForm {
            credit_code: Some("91350211m0000xuf2b".to_string()),
            level: Some("VIP".to_string()),
            status: Some("potential".to_string()),
            ..valid_form()
        };

        let customer = NewCustomer::try_from(form).expect("valid form");

        assert_eq!(
            customer.credit_code.as_ref().map(|c| c.as_str()),
            Some("91350211M0000XUF2B")
        );
        assert_eq!(customer.level, CustomerLevel::Vip);
        assert_eq!(customer.status, CustomerStatus::Potential);
    }

    #[test]
    fn rejects_unknown_choice() {
        let form = CustomerForm {
            source: Some("billboard".to_string()),
            ..valid_form()
        };

        assert!(matches!(
            NewCustomer::try_from(form),
            Err(FormError::InvalidChoice("source"))
        ));
    }

    /// Sanitizes remarks before they leave the client.
    #[test]
    fn remarks_are_sanitized() {
        let form = CustomerForm {
            remarks: Some("<script>alert(1)</script>Prefers email".to_string()),
            ..valid_form()
        };

        let customer = NewCustomer::try_from(form).expect("valid form");

        assert_eq!(
            customer.remarks.as_ref().map(|r| r.as_str()),
            Some("Prefers email")
        );
    }

    #[test]
    fn patch_keeps_only_filled_fields() {
        let form = CustomerPatchForm {
            city: Some("Shenzhen".to_string()),
            email: Some("Sales@Acme.example".to_string()),
            province: Some("  ".to_string()),
            ..Default::default()
        };

        let update = UpdateCustomer::try_from(form).expect("valid patch");

        assert_eq!(update.city.as_deref(), Some("Shenzhen"));
        assert_eq!(
            update.email.as_ref().map(|e| e.as_str()),
            Some("sales@acme.example")
        );
        assert!(update.province.is_none());
        assert!(update.company_name.is_none());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let result = UpdateCustomer::try_from(CustomerPatchForm::default());

        assert!(matches!(result, Err(FormError::NothingToUpdate)));
    }
}
