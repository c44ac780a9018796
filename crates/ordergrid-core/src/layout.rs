//! Column layouts for the two sheets of a workbook.
//!
//! The main sheet carries one order per row group across 72 columns (`A..BT`);
//! the trucking sheet is the carrier upload format with 52 columns, many of
//! which have fixed defaults.

use ordergrid_engine::engine::{index_to_letters, letters_to_index};
use serde::{Deserialize, Serialize};

/// How a column's values are entered and displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    /// Holds a `data:image/...` URI set through a raw-value write.
    Image,
}

/// A static column definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnDef {
    pub id: &'static str,
    pub label: &'static str,
    pub width: u32,
    pub kind: ColumnKind,
    pub default: Option<&'static str>,
}

const fn col(
    id: &'static str,
    label: &'static str,
    width: u32,
    kind: ColumnKind,
    default: Option<&'static str>,
) -> ColumnDef {
    ColumnDef {
        id,
        label,
        width,
        kind,
        default,
    }
}

pub const MAIN_COLUMNS: [ColumnDef; 72] = [
    col("serial", "序号", 60, ColumnKind::Text, None),
    col("date_out", "出单日期", 110, ColumnKind::Text, None),
    col("image", "产品图", 100, ColumnKind::Image, None),
    col("cm_label", "厘米", 80, ColumnKind::Text, None),
    col("inch_label", "英寸", 80, ColumnKind::Text, None),
    col("region", "区域", 80, ColumnKind::Text, None),
    col("factory_model", "工厂内部型号", 130, ColumnKind::Text, None),
    col("shipping_method", "包装/尾程方式", 130, ColumnKind::Text, None),
    col("payment_status", "货款已付", 90, ColumnKind::Text, None),
    col("shop_name", "店铺", 110, ColumnKind::Text, None),
    col("order_id", "订单编号", 170, ColumnKind::Text, None),
    col("internal_order_id", "内部订单号", 130, ColumnKind::Text, None),
    col("product_name", "产品名", 180, ColumnKind::Text, None),
    col("supplier", "供应商", 120, ColumnKind::Text, None),
    col("qty", "采购数量", 70, ColumnKind::Number, None),
    col("unit_price", "单价", 70, ColumnKind::Number, None),
    col("total_price", "总价", 90, ColumnKind::Text, None),
    col("track_1688", "1688运输单号", 170, ColumnKind::Text, None),
    col("order_date", "下单日期", 110, ColumnKind::Text, None),
    col("ship_out_date", "供应商出货日期", 110, ColumnKind::Text, None),
    col("hj_arrival_date", "到花街日期", 110, ColumnKind::Text, None),
    col("ship_departure_date", "开船日期", 110, ColumnKind::Text, None),
    col("port_arrival_date", "到港日期", 110, ColumnKind::Text, None),
    col("tracking_num", "单号", 150, ColumnKind::Text, None),
    col("first_leg_type", "头程", 90, ColumnKind::Text, None),
    col("last_leg_type", "尾程", 90, ColumnKind::Text, None),
    col("sets_count", "套数", 70, ColumnKind::Text, None),
    col("sets_per_box", "每箱套数", 80, ColumnKind::Text, None),
    col("total_boxes", "总箱数", 80, ColumnKind::Text, None),
    col("box_specs", "货代箱规", 120, ColumnKind::Text, None),
    col("billing_weight", "计费重量", 90, ColumnKind::Text, None),
    col("hj_unit_price", "花街单价", 80, ColumnKind::Text, None),
    col("first_leg_total", "头程运费总价", 110, ColumnKind::Text, None),
    col("pack_fee", "包材费", 80, ColumnKind::Text, None),
    col("outbound_fee", "出库费", 80, ColumnKind::Text, None),
    col("domestic_freight", "国内运费", 90, ColumnKind::Text, None),
    col("other_fee", "其他", 80, ColumnKind::Text, None),
    col("shipping_cost_per_set", "每套运费成本", 110, ColumnKind::Text, None),
    col("weight_kg", "毛重小于68kg", 110, ColumnKind::Text, None),
    col("len_cm", "长cm", 70, ColumnKind::Text, None),
    col("width_cm", "宽cm", 70, ColumnKind::Text, None),
    col("height_cm", "高cm", 70, ColumnKind::Text, None),
    col("len_in", "长in", 70, ColumnKind::Text, None),
    col("width_in", "宽in", 70, ColumnKind::Text, None),
    col("height_in", "高in", 70, ColumnKind::Text, None),
    col("weight_lb", "镑重量", 90, ColumnKind::Text, None),
    col("calc_vol_weight", "自算计费重", 110, ColumnKind::Text, None),
    col("customer_address", "客户地址", 280, ColumnKind::Text, None),
    col("fedex_method", "联邦方式", 110, ColumnKind::Text, None),
    col("fedex_tracking", "联邦单号", 170, ColumnKind::Text, None),
    col("fedex_usd", "联邦美金", 90, ColumnKind::Text, None),
    col("rebate", "反弹", 80, ColumnKind::Text, None),
    col("rebate_return", "反弹退回", 90, ColumnKind::Text, None),
    col("buy_shipping", "购买配送", 100, ColumnKind::Text, None),
    col("fedex_rmb", "联邦人民币", 110, ColumnKind::Text, None),
    col("total_cost", "总成本", 110, ColumnKind::Text, None),
    col("recovery", "回款", 110, ColumnKind::Text, None),
    col("profit", "利润", 110, ColumnKind::Text, None),
    col("sales_price", "售价", 90, ColumnKind::Text, None),
    col("refunded", "被退款", 90, ColumnKind::Text, None),
    col("claim_amount", "索赔额", 90, ColumnKind::Text, None),
    col("sku", "SKU", 140, ColumnKind::Text, None),
    col("ship_date", "发货日", 110, ColumnKind::Text, None),
    col("delivery_date", "送达日", 110, ColumnKind::Text, None),
    col("truck_tracking", "卡派后台单号", 170, ColumnKind::Text, None),
    col("oversize", "oversize 130及165", 140, ColumnKind::Text, None),
    col("perimeter", "周长＜419", 110, ColumnKind::Text, None),
    col("ship_image", "出货图", 100, ColumnKind::Image, None),
    col("pod", "POD", 100, ColumnKind::Image, None),
    col("sign_image", "签收图", 100, ColumnKind::Image, None),
    col("other_misc", "其他", 140, ColumnKind::Text, None),
    col("bill_month", "账单月份", 120, ColumnKind::Text, None),
];

pub const TRUCK_COLUMNS: [ColumnDef; 52] = [
    col("shipper_zip", "Shipper Zip Code*", 140, ColumnKind::Text, Some("91733")),
    col("pickup_date", "Pickup Date*", 140, ColumnKind::Text, None),
    col("shipper_city", "Shipper City*", 140, ColumnKind::Text, Some("South El Monte")),
    col("shipper_state", "Shipper State*", 140, ColumnKind::Text, Some("CA")),
    col("shipper_country", "Shipper Country*", 140, ColumnKind::Text, Some("US")),
    col("shipper_addr_type", "Shipper Address Type*", 140, ColumnKind::Text, Some("Business with dock")),
    col("shipper_service", "Shipper Service", 140, ColumnKind::Text, None),
    col("shipper_contact", "Shipper Contact Name", 140, ColumnKind::Text, Some("mike")),
    col("shipper_phone", "Shipper Contact Phone", 140, ColumnKind::Text, Some("567-227-7777")),
    col("shipper_email", "Shipper Contact Email", 140, ColumnKind::Text, Some("chenjinrong@wedoexpress.com")),
    col("shipper_addr_name", "Shipper Address Name", 180, ColumnKind::Text, Some("CHAINYO SUPPLYCHAIN MANAGEMENT INC")),
    col("shipper_line1", "Shipper Address Line1", 180, ColumnKind::Text, Some("1230 Santa Anita Ave")),
    col("shipper_line2", "Shipper Address Line2", 140, ColumnKind::Text, Some("Unit H")),
    col("pickup_from", "Pickup Time From", 120, ColumnKind::Text, Some("09:30")),
    col("pickup_to", "Pickup Time To", 120, ColumnKind::Text, Some("17:30")),
    col("order_no", "Customer orderNo", 160, ColumnKind::Text, None),
    col("ref", "Ref", 160, ColumnKind::Text, None),
    col("shipper_remark", "Shipper Remark", 140, ColumnKind::Text, None),
    col("receiver_zip", "Receiver Zip Code*", 140, ColumnKind::Text, None),
    col("receiver_city", "Receiver City*", 140, ColumnKind::Text, None),
    col("receiver_state", "Receiver State*", 140, ColumnKind::Text, None),
    col("receiver_country", "Receiver Country*", 140, ColumnKind::Text, Some("US")),
    col("receiver_addr_type", "Receiver Address Type*", 140, ColumnKind::Text, Some("Residential")),
    col("receiver_service", "Receiver Service", 140, ColumnKind::Text, Some("Lift-Gate；APPT")),
    col("receiver_contact", "Receiver Contact Name", 140, ColumnKind::Text, None),
    col("receiver_phone", "Receiver Contact Phone", 140, ColumnKind::Text, None),
    col("receiver_email", "Receiver Contact Email", 140, ColumnKind::Text, Some("chenjinrong@wedoexpress.com")),
    col("receiver_addr_name", "Receiver Address Name", 160, ColumnKind::Text, None),
    col("receiver_line1", "Receiver Address Line1", 180, ColumnKind::Text, None),
    col("receiver_line2", "Receiver Address Line2", 140, ColumnKind::Text, None),
    col("delivery_from", "Delivery Time From", 120, ColumnKind::Text, Some("09:00")),
    col("delivery_to", "Delivery Time To", 120, ColumnKind::Text, Some("16:30")),
    col("receiver_remark", "Receiver Remark", 140, ColumnKind::Text, None),
    col("size_unit", "Size Unit*", 120, ColumnKind::Text, Some("in/lb")),
    col("name", "Name*", 140, ColumnKind::Text, Some("Bathroom Vanity")),
    col("package_type", "Package Type*", 140, ColumnKind::Text, Some("CRATE")),
    col("package_qty", "Package Qty*", 120, ColumnKind::Text, Some("1")),
    col("pallet_type", "Pallet Type*", 140, ColumnKind::Text, Some("PALLETS")),
    col("pallet_qty", "Pallet Qty*", 120, ColumnKind::Text, Some("1")),
    col("declared_val", "Declared($)*", 120, ColumnKind::Text, None),
    col("length", "Length*", 90, ColumnKind::Text, None),
    col("width", "Width*", 90, ColumnKind::Text, None),
    col("height", "Height*", 90, ColumnKind::Text, None),
    col("weight", "Weight*", 90, ColumnKind::Text, None),
    col("nmfc", "NMFC", 90, ColumnKind::Text, None),
    col("goods_describe", "Goods Describe", 180, ColumnKind::Text, None),
    col("box_weight", "Box Weight", 90, ColumnKind::Text, None),
    col("box_length", "Box Length", 90, ColumnKind::Text, None),
    col("box_width", "Box Width", 90, ColumnKind::Text, None),
    col("box_height", "Box Height", 90, ColumnKind::Text, None),
    col("declared_val_footer", "Declared($)", 120, ColumnKind::Text, None),
    col("remark", "Remark", 140, ColumnKind::Text, None),
];

/// Main-sheet columns whose cells are merged across all rows of an imported order.
pub const MERGED_COLUMNS: [&str; 45] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "Y",
    "AH", "AI", "AJ", "AK", "AL", "AV", "AY", "AZ", "BA", "BB", "BC", "BD", "BE", "BF", "BG",
    "BH", "BI", "BJ", "BK", "BL", "BM", "BN", "BO", "BP", "BQ", "BR", "BS",
];

pub fn is_merged_column(col: &str) -> bool {
    MERGED_COLUMNS.contains(&col)
}

/// Which sheet layout a sheet uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Main,
    Truck,
}

impl Layout {
    pub fn columns(&self) -> &'static [ColumnDef] {
        match self {
            Layout::Main => &MAIN_COLUMNS,
            Layout::Truck => &TRUCK_COLUMNS,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    pub fn column(&self, col: &str) -> Option<&'static ColumnDef> {
        self.columns().get(letters_to_index(col)?)
    }

    /// Column letters of the column with the given id.
    pub fn letters_of(&self, id: &str) -> Option<String> {
        self.columns()
            .iter()
            .position(|c| c.id == id)
            .map(index_to_letters)
    }
}
