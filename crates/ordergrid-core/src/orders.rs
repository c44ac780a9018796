//! Heuristic extraction of order records from pasted seller-portal text.
//!
//! Every field is optional: a pattern that does not match leaves its field
//! empty, it never fails the parse.

use regex::Regex;
use std::sync::OnceLock;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect(concat!("valid regex: ", stringify!($name))))
        }
    };
}

static_regex!(order_id_re, r"订单编号：#\s*([\s\S]+?)\s*(?:您的卖家订单编号：|\z)");
static_regex!(sku_re, r"(?i)SKU:\s*([\s\S]+?)\s*(?:状况:|\z)");
static_regex!(product_name_re, r"已发货\s*([\s\S]+?)\s*(?:ASIN|\z)");
static_regex!(inch_re, r"(?i)(\d+(?:\.\d+)?)\s*IN");
static_regex!(purchase_date_re, r"购买日期:\s*([^\n\r]+)");
static_regex!(ship_date_re, r"发货日期:\s*([^\n\r]+)");
static_regex!(delivery_date_re, r"送达日期:\s*([^\n\r]+)");
static_regex!(price_re, r"US\$\s*([\d,.]+)\s*(?:商品小计:|\z)");
static_regex!(
    tracking_re,
    r"追踪编码\s*[\n\r]+\s*([\s\S]+?)\s*(?:配送服务|承运人|\z)"
);
static_regex!(address_re, r"配送地址\s*([\s\S]+?电话:\s*[\d\s+-]+)");
static_regex!(cn_date_re, r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日");

static_regex!(phone_re, r"(?i)(?:电话|Phone|Tel)[:：]?\s*([\d\s+-]+)");
static_regex!(zip_re, r"\b\d{5}(?:-\d{4})?\b");
static_regex!(state_re, r"\b([A-Z]{2})\b");
static_regex!(city_re, r"([^,\n\r]+),\s*[A-Z]{2}\s*\d{5}");
static_regex!(internal_model_re, r"[A-Z0-9-]{5,}(?:\s[A-Z0-9-]{2,})?");

/// Fields pulled out of one pasted order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub sku: String,
    pub product_name: String,
    pub inch_size: String,
    pub purchase_date: String,
    pub ship_date: String,
    pub delivery_date: String,
    pub sales_price: String,
    pub shipping_method: String,
    pub tracking_numbers: Vec<String>,
    pub full_address: String,
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Normalize a `YYYY年M月D日` date to `YYYY/MM/DD`. Anything else is returned trimmed.
pub fn normalize_date(date: &str) -> String {
    match cn_date_re().captures(date) {
        Some(caps) => format!("{}/{:0>2}/{:0>2}", &caps[1], &caps[2], &caps[3]),
        None => date.trim().to_string(),
    }
}

/// Parse the text of a pasted order page.
pub fn parse_order_text(text: &str) -> OrderRecord {
    let mut record = OrderRecord::default();

    if let Some(id) = capture(order_id_re(), text) {
        record.order_id = id;
    }
    if let Some(sku) = capture(sku_re(), text) {
        record.sku = sku;
    }
    if let Some(name) = capture(product_name_re(), text) {
        if let Some(inch) = capture(inch_re(), &name) {
            record.inch_size = inch;
        }
        record.product_name = name;
    }
    if let Some(date) = capture(purchase_date_re(), text) {
        record.purchase_date = normalize_date(&date);
    }

    // The ship date of interest is the one in the order overview section.
    let ship_part = text.find("订单一览").map_or(text, |idx| &text[idx..]);
    if let Some(date) = capture(ship_date_re(), ship_part) {
        record.ship_date = normalize_date(&date);
    }
    if let Some(date) = capture(delivery_date_re(), text) {
        record.delivery_date = normalize_date(&date);
    }
    if let Some(price) = capture(price_re(), text) {
        record.sales_price = price.replace(',', "");
    }
    if let Some(block) = capture(tracking_re(), text) {
        record.tracking_numbers = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(last) = text.lines().map(str::trim).filter(|l| !l.is_empty()).last() {
        record.shipping_method = last.to_string();
    }
    if let Some(address) = capture(address_re(), text) {
        record.full_address = address;
    }

    tracing::debug!(
        order_id = %record.order_id,
        tracking = record.tracking_numbers.len(),
        "parsed order text"
    );
    record
}

/// Recipient details extracted from a free-form address block.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressDetails {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub address_type: String,
}

impl Default for AddressDetails {
    fn default() -> Self {
        AddressDetails {
            name: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            phone: String::new(),
            address_type: "Residential".to_string(),
        }
    }
}

/// Split an address block into recipient fields.
///
/// The first non-empty line is the name; the second is the street, cut off
/// where the city begins.
pub fn extract_address_details(address: &str) -> AddressDetails {
    let mut details = AddressDetails::default();

    if let Some(phone) = capture(phone_re(), address) {
        let phone = phone.strip_prefix("+1").unwrap_or(&phone).trim_start();
        details.phone = phone.to_string();
    }
    if let Some(zip) = zip_re().find(address) {
        details.zip = zip.as_str().chars().take(5).collect();
    }
    if let Some(state) = capture(state_re(), address) {
        details.state = state;
    }
    if let Some(city) = capture(city_re(), address) {
        details.city = city;
    }

    if address.contains("住宅") || address.contains("Residential") {
        details.address_type = "Residential".to_string();
    } else if address.contains("商业") || address.contains("Business") {
        details.address_type = "Business with dock".to_string();
    }

    let mut lines = address.lines().map(str::trim).filter(|l| !l.is_empty());
    if let Some(first) = lines.next() {
        details.name = first.replace("配送地址", "").trim().to_string();
    }
    if let Some(second) = lines.next() {
        let street = match second.find(details.city.as_str()) {
            Some(idx) if !details.city.is_empty() => second[..idx].trim(),
            _ => second,
        };
        details.street = street.strip_suffix(',').unwrap_or(street).trim().to_string();
    }

    details
}

/// The factory model code inside a product name, or the whole name if none.
pub fn extract_internal_model(product_name: &str) -> String {
    internal_model_re()
        .find(product_name)
        .map_or_else(|| product_name.to_string(), |m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "订单编号：# 112-1234567-1234567
您的卖家订单编号：112-1234567-1234567
配送地址
John Smith
123 Main St, Springfield, IL 62704
住宅
电话: +1 951 377-0023
购买日期: 2024年3月5日
订单一览
发货日期: 2024年3月7日
送达日期: 2024年3月12日
已发货
Modern CAB-3000 BL 36 IN Vanity
ASIN: B0ABC12345
SKU: VAN-36-WH
状况: 新品
US$ 1,299.99
商品小计:
追踪编码
123456789012
987654321098
配送服务
FedEx Ground
";

    #[test]
    fn test_parse_order_text_fields() {
        let record = parse_order_text(SAMPLE);
        assert_eq!(record.order_id, "112-1234567-1234567");
        assert_eq!(record.sku, "VAN-36-WH");
        assert_eq!(record.product_name, "Modern CAB-3000 BL 36 IN Vanity");
        assert_eq!(record.inch_size, "36");
        assert_eq!(record.purchase_date, "2024/03/05");
        assert_eq!(record.ship_date, "2024/03/07");
        assert_eq!(record.delivery_date, "2024/03/12");
        assert_eq!(record.sales_price, "1299.99");
        assert_eq!(record.shipping_method, "FedEx Ground");
        assert_eq!(record.tracking_numbers, vec!["123456789012", "987654321098"]);
        assert!(record.full_address.starts_with("John Smith"));
        assert!(record.full_address.ends_with("951 377-0023"));
    }

    #[test]
    fn test_parse_order_text_missing_fields_stay_empty() {
        let record = parse_order_text("nothing useful here");
        assert_eq!(record.order_id, "");
        assert_eq!(record.sales_price, "");
        assert!(record.tracking_numbers.is_empty());
        assert_eq!(record.shipping_method, "nothing useful here");
    }

    #[test]
    fn test_extract_address_details() {
        let record = parse_order_text(SAMPLE);
        let details = extract_address_details(&record.full_address);
        assert_eq!(details.name, "John Smith");
        assert_eq!(details.street, "123 Main St");
        assert_eq!(details.city, "Springfield");
        assert_eq!(details.state, "IL");
        assert_eq!(details.zip, "62704");
        assert_eq!(details.phone, "951 377-0023");
        assert_eq!(details.address_type, "Residential");
    }

    #[test]
    fn test_extract_address_business_and_zip4() {
        let details = extract_address_details("Acme Corp\n9 Dock Rd, Reno, NV 89501-1234\nBusiness");
        assert_eq!(details.zip, "89501");
        assert_eq!(details.city, "Reno");
        assert_eq!(details.street, "9 Dock Rd");
        assert_eq!(details.address_type, "Business with dock");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024年3月5日"), "2024/03/05");
        assert_eq!(normalize_date("2024 年 12 月 25 日"), "2024/12/25");
        assert_eq!(normalize_date(" 2024/01/01 "), "2024/01/01");
    }

    #[test]
    fn test_extract_internal_model() {
        assert_eq!(extract_internal_model("Modern CAB-3000 BL 36 IN Vanity"), "CAB-3000 BL");
        assert_eq!(extract_internal_model("small vanity"), "small vanity");
    }
}
