// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成德语 POS 周导出 CSV（分号分隔、逗号小数）
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use chrono::{Datelike, Duration, Local, NaiveDate};
use csv::WriterBuilder;
use std::error::Error;
use std::fs::{self, File};

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

// CSV 表头（德语 POS 导出列名）
const CSV_HEADER: &[&str] = &[
    "Artikelnummer",
    "Kategorie",
    "Jahr",
    "KW",
    "Lagerbestand",
    "Verkäufe",
    "Preis",
    "Einkaufspreis",
];

const CATEGORIES: &[&str] = &["Jacken", "Mäntel", "Strick", "T-Shirts", "Hosen", "Schuhe"];

// 周销量记录
#[derive(Clone)]
struct WeeklyRecord {
    article_id: String,
    category: String,
    year: String,
    week: String,
    stock: String,
    sales: String,
    price: String,
    cost: String,
}

impl WeeklyRecord {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.article_id.clone(),
            self.category.clone(),
            self.year.clone(),
            self.week.clone(),
            self.stock.clone(),
            self.sales.clone(),
            self.price.clone(),
            self.cost.clone(),
        ]
    }
}

/// 德语数字格式（逗号小数）
fn de_decimal(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// 以 `end` 所在 ISO 周为终点，往前 weeks 周
fn iso_weeks_back(end: NaiveDate, weeks: usize) -> Vec<(i32, u32)> {
    (0..weeks)
        .rev()
        .map(|back| {
            let iso = (end - Duration::weeks(back as i64)).iso_week();
            (iso.year(), iso.week())
        })
        .collect()
}

// 生成单个商品的周序列
fn generate_article(index: usize, weeks: &[(i32, u32)], velocity: f64) -> Vec<WeeklyRecord> {
    let price = 19.99 + (index % 12) as f64 * 10.0;
    let cost = price * 0.45;
    let mut stock = 40.0 + (index % 9) as f64 * 25.0;

    weeks
        .iter()
        .enumerate()
        .map(|(i, (year, week))| {
            // 周销量按位置做小幅波动
            let sales = (velocity * (1.0 + ((index + i) % 3) as f64 * 0.25)).round();
            stock = (stock - sales).max(0.0);
            WeeklyRecord {
                article_id: format!("SKU{:06}", index + 1),
                category: CATEGORIES[index % CATEGORIES.len()].to_string(),
                year: year.to_string(),
                week: week.to_string(),
                stock: format!("{}", stock),
                sales: format!("{}", sales),
                price: de_decimal(price),
                cost: de_decimal(cost),
            }
        })
        .collect()
}

fn write_dataset(name: &str, records: &[WeeklyRecord]) -> Result<(), Box<dyn Error>> {
    let path = format!("{}/{}", OUTPUT_DIR, name);
    let file = File::create(&path)?;
    let mut wtr = WriterBuilder::new().delimiter(b';').from_writer(file);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(record.to_row())?;
    }
    wtr.flush()?;

    println!("  ✓ {} ({} 行)", path, records.len());
    Ok(())
}

// 1. 正常数据: 100 个商品 × 8 周
fn generate_normal_data(weeks: &[(i32, u32)]) -> Result<(), Box<dyn Error>> {
    let records: Vec<WeeklyRecord> = (0..100)
        .flat_map(|i| generate_article(i, weeks, 2.0 + (i % 7) as f64))
        .collect();
    write_dataset("normal_pos_export.csv", &records)
}

// 2. 大数据集: 2000 个商品 × 8 周
fn generate_large_dataset(weeks: &[(i32, u32)]) -> Result<(), Box<dyn Error>> {
    let records: Vec<WeeklyRecord> = (0..2000)
        .flat_map(|i| generate_article(i, weeks, 1.0 + (i % 11) as f64))
        .collect();
    write_dataset("large_pos_export.csv", &records)
}

// 3. 零销量商品（新品或滞销）
fn generate_zero_sales(weeks: &[(i32, u32)]) -> Result<(), Box<dyn Error>> {
    let records: Vec<WeeklyRecord> = (0..20)
        .flat_map(|i| generate_article(i, weeks, 0.0))
        .collect();
    write_dataset("zero_sales_pos_export.csv", &records)
}

// 4. 同一商品同一周多行（多门店合并前）
fn generate_duplicate_rows(weeks: &[(i32, u32)]) -> Result<(), Box<dyn Error>> {
    let mut records = Vec::new();
    for i in 0..20 {
        let base = generate_article(i, weeks, 3.0);
        records.extend(base.iter().cloned());
        records.extend(base);
    }
    write_dataset("duplicate_rows_pos_export.csv", &records)
}

// 5. 缺失必填字段 / 非法值
fn generate_invalid_rows(weeks: &[(i32, u32)]) -> Result<(), Box<dyn Error>> {
    let mut records: Vec<WeeklyRecord> = (0..30)
        .flat_map(|i| generate_article(i, weeks, 2.0))
        .collect();

    for (i, record) in records.iter_mut().enumerate() {
        match i % 10 {
            0 => record.category = String::new(),
            1 => record.stock = "-3".to_string(),
            2 => record.week = "60".to_string(),
            3 => record.sales = "n/a".to_string(),
            4 => record.price = de_decimal(1.0), // 低于成本，仅警告
            _ => {}
        }
    }
    write_dataset("invalid_rows_pos_export.csv", &records)
}

// 6. 跨年窗口（KW50 → 次年 KW3）
fn generate_year_end(year: i32) -> Result<(), Box<dyn Error>> {
    let end = NaiveDate::from_isoywd_opt(year + 1, 3, chrono::Weekday::Mon)
        .ok_or("无效的 ISO 周")?;
    let weeks = iso_weeks_back(end, 8);
    let records: Vec<WeeklyRecord> = (0..50)
        .flat_map(|i| generate_article(i, &weeks, 4.0))
        .collect();
    write_dataset("year_end_pos_export.csv", &records)
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    fs::create_dir_all(OUTPUT_DIR)?;

    let today = Local::now().date_naive();
    let weeks = iso_weeks_back(today, 8);

    generate_normal_data(&weeks)?;
    generate_large_dataset(&weeks)?;
    generate_zero_sales(&weeks)?;
    generate_duplicate_rows(&weeks)?;
    generate_invalid_rows(&weeks)?;
    generate_year_end(today.year() - 1)?;

    println!("测试数据集生成完成");
    Ok(())
}
