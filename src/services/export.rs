//! CSV export of the displayed customer page.

use std::io::Write;

use crate::domain::customer::Customer;
use crate::domain::query::PageResult;

const HEADER: [&str; 13] = [
    "customer_id",
    "company_name",
    "contact_name",
    "contact_phone",
    "credit_code",
    "customer_type",
    "province",
    "city",
    "email",
    "status",
    "level",
    "source",
    "created_at",
];

/// Writes the page's customers as CSV with a header row. Enumerated
/// attributes are written as their display labels.
pub fn write_csv<W: Write>(page: &PageResult<Customer>, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for customer in page.items() {
        let key = customer.key.to_string();
        let created_at = customer.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
        wtr.write_record([
            key.as_str(),
            customer.company_name.as_str(),
            customer.contact_name.as_str(),
            customer.contact_phone.as_str(),
            customer.credit_code.as_deref().unwrap_or_default(),
            customer.customer_type.label(),
            customer.province.as_deref().unwrap_or_default(),
            customer.city.as_deref().unwrap_or_default(),
            customer.email.as_deref().unwrap_or_default(),
            customer.status.label(),
            customer.level.label(),
            customer.source.label(),
            created_at.as_str(),
        ])?;
    }

    wtr.flush()?;
    log::debug!("Exported {} customers", page.items().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::customer::{CustomerLevel, CustomerStatus};
    use crate::domain::types::{CustomerKey, PageNumber, PageSize};

    fn customer() -> Customer {
        let created = NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("valid timestamp");
        Customer {
            id: 1,
            key: "5f0c5a1e-3f7a-4d8e-9a55-0b8f3c2e6d11"
                .parse::<CustomerKey>()
                .expect("valid key"),
            company_name: "Acme, Inc.".to_string(),
            contact_name: "Jane Doe".to_string(),
            contact_phone: "13800138000".to_string(),
            credit_code: None,
            customer_type: Default::default(),
            province: Some("Guangdong".to_string()),
            city: None,
            address: None,
            email: Some("jane@acme.example".to_string()),
            website: None,
            industry: None,
            erp_system: None,
            erp_customer_code: None,
            status: CustomerStatus::Potential,
            level: CustomerLevel::Vip,
            source: Default::default(),
            remarks: None,
            created_at: created,
            updated_at: created,
        }
    }

    /// Writes a header row and labelled values, quoting embedded commas.
    #[test]
    fn writes_header_and_labelled_rows() {
        let page = PageResult::new(
            vec![customer()],
            1,
            PageNumber::FIRST,
            PageSize::default(),
        );
        let mut out = Vec::new();

        write_csv(&page, &mut out).expect("csv written");

        let text = String::from_utf8(out).expect("utf-8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
        let row = lines.next().expect("data row");
        assert!(row.starts_with("5f0c5a1e-3f7a-4d8e-9a55-0b8f3c2e6d11,\"Acme, Inc.\",Jane Doe,"));
        assert!(row.contains(",Potential,VIP,"));
        assert!(row.ends_with(",2024-05-17 08:30:00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_page_writes_only_header() {
        let page: PageResult<Customer> =
            PageResult::new(Vec::new(), 0, PageNumber::FIRST, PageSize::default());
        let mut out = Vec::new();

        write_csv(&page, &mut out).expect("csv written");

        assert_eq!(String::from_utf8(out).expect("utf-8").lines().count(), 1);
    }
}
