#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use stock_lookup::{EngineConfig, load_config_path};
use tempfile::TempDir;

/// Column header plus eight report rows (nine non-blank rows), with blank
/// lines in between and the period line last.
pub const STOCK_HEADER: &str = "Particulars,Closing,,\nShop\n12 Market Road\n\nStock Summary\nGodown: Main\n\nGroup: All\nClosing Balance\n,Quantity,Rate,Value\n1-Apr-24 to 10-Sep-24\n\n";

/// A scratch directory holding the four exports, an image folder and a
/// config file pointing at them with relative paths.
pub struct Fixture {
    dir: TempDir, // keep alive for the life of the test
}

impl Fixture {
    /// Shop data used by most tests:
    /// - 4521: 200 pcs (20000 scaled), condition 15000, subs 4600 / 4700 / 9999
    /// - 4600: 0 pcs
    /// - 4700: 50 pcs, condition 1000
    pub fn shop() -> Self {
        let fx = Self::empty();
        fx.write_stock(&[
            "4521 Wedding Card,200 pcs,12.50,2500",
            "4600 Gift Bag,0 pcs,3,0",
            "4700 Ribbon Roll,50 pcs,8,400",
        ]);
        fx.write_price(&["4521,12.50", "4700,8"]);
        fx.write_threshold(&["4521,15000", "4700,1000"]);
        fx.write_substitutes(&["4521,4600,4700,9999", "4700,4521,,"]);
        fx.write_image("4521.jpg");
        fx.write_image("catalog/item_04700 front.png");
        fx
    }

    /// Config and empty exports only.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let fx = Self { dir };
        fx.write("engine.toml", &Self::config_text());
        fx.write_stock(&[]);
        fx.write_price(&[]);
        fx.write_threshold(&[]);
        fx.write_substitutes(&[]);
        fs::create_dir_all(fx.path().join("images")).expect("images dir");
        fx
    }

    fn config_text() -> String {
        r#"
dump_path = "out/master.csv"

[sources]
stock = "stock.csv"
price = "price.csv"
threshold = "condition.csv"
substitutes = "alt.csv"

[assets]
root = "images"
extensions = ["jpg", "jpeg", "png"]
"#
        .to_string()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("engine.toml")
    }

    pub fn config(&self) -> EngineConfig {
        load_config_path(self.config_path()).expect("load config")
    }

    pub fn write(&self, rel: &str, text: &str) {
        let p = self.path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(p, text).expect("write");
    }

    pub fn write_stock(&self, rows: &[&str]) {
        self.write("stock.csv", &format!("{STOCK_HEADER}{}", lines(rows)));
    }

    pub fn write_price(&self, rows: &[&str]) {
        self.write("price.csv", &format!("ITEM NO.,RATE\n{}", lines(rows)));
    }

    pub fn write_threshold(&self, rows: &[&str]) {
        self.write("condition.csv", &format!("ITEM NO.,CONDITION\n{}", lines(rows)));
    }

    pub fn write_substitutes(&self, rows: &[&str]) {
        self.write("alt.csv", &format!("ITEM NO.,Alt1,Alt2,Alt3\n{}", lines(rows)));
    }

    pub fn write_image(&self, rel: &str) -> PathBuf {
        let p = self.path().join("images").join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&p, b"\xFF\xD8").expect("write image");
        p
    }
}

fn lines(rows: &[&str]) -> String {
    rows.iter().map(|r| format!("{r}\n")).collect()
}
