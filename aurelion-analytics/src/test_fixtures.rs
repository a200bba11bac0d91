//! Sample store data for tests, benches and demos.
//!
//! The dataset is small enough to reason about by hand:
//!
//! - six customers, two of whom (5 and 6) never bought anything;
//! - ten sales, one of them (108) referencing customer 99, who does not exist;
//! - customers 1 and 2 tie at three purchases each.

use crate::config::AnalyticsConfig;
use crate::core::AnalysisSession;
use crate::error::Result;
use crate::sources::TableName;
use std::fs;
use std::path::Path;

pub const SAMPLE_CUSTOMERS: &str = "\
id_cliente,nombre_cliente,email,ciudad,fecha_alta
1,Mariana Lopez,mariana.lopez@mail.com,Carlos Paz,2023-01-15
2,Nicolas Rojas,nicolas.rojas@mail.com,Rio Cuarto,2023-02-03
3,Hernan Martinez,hernan.martinez@mail.com,Cordoba,2023-03-10
4,Uriel Alvarez,uriel.alvarez@mail.com,Alta Gracia,2023-04-22
5,Florencia Gomez,florencia.gomez@mail.com,Villa Maria,2023-05-08
6,Bruno Diaz,bruno.diaz@mail.com,Cordoba,2023-06-30
";

pub const SAMPLE_PRODUCTS: &str = "\
id_producto,nombre_producto,categoria,precio_unitario
1,Coca Cola 1.5L,Alimentos,2347.5
2,Pepsi 1.5L,Alimentos,2250.0
3,Yerba Mate 1kg,Alimentos,4500.0
4,Detergente 750ml,Limpieza,1600.0
5,Jabon en polvo 3kg,Limpieza,5200.0
";

pub const SAMPLE_SALES: &str = "\
id_venta,fecha,id_cliente,nombre_cliente,email,medio_pago
101,2024-01-02,1,Mariana Lopez,mariana.lopez@mail.com,efectivo
102,2024-01-05,2,Nicolas Rojas,nicolas.rojas@mail.com,tarjeta
103,2024-01-07,1,Mariana Lopez,mariana.lopez@mail.com,qr
104,2024-01-09,3,Hernan Martinez,hernan.martinez@mail.com,tarjeta
105,2024-01-11,1,Mariana Lopez,mariana.lopez@mail.com,tarjeta
106,2024-01-12,2,Nicolas Rojas,nicolas.rojas@mail.com,transferencia
107,2024-01-15,4,Uriel Alvarez,uriel.alvarez@mail.com,tarjeta
108,2024-01-18,99,,,qr
109,2024-01-20,3,Hernan Martinez,hernan.martinez@mail.com,efectivo
110,2024-01-22,2,Nicolas Rojas,nicolas.rojas@mail.com,tarjeta
";

pub const SAMPLE_SALE_LINES: &str = "\
id_venta,id_producto,nombre_producto,cantidad,precio_unitario,importe
101,1,Coca Cola 1.5L,2,2347.5,4695.0
101,3,Yerba Mate 1kg,1,4500.0,4500.0
102,4,Detergente 750ml,3,1600.0,4800.0
103,2,Pepsi 1.5L,1,2250.0,2250.0
104,5,Jabon en polvo 3kg,1,5200.0,5200.0
104,1,Coca Cola 1.5L,1,2347.5,2347.5
105,3,Yerba Mate 1kg,2,4500.0,9000.0
106,4,Detergente 750ml,1,1600.0,1600.0
107,2,Pepsi 1.5L,4,2250.0,9000.0
108,1,Coca Cola 1.5L,1,2347.5,2347.5
109,5,Jabon en polvo 3kg,2,5200.0,10400.0
110,3,Yerba Mate 1kg,1,4500.0,4500.0
";

/// Contents of the sample file for `table`.
pub fn sample_csv(table: TableName) -> &'static str {
    match table {
        TableName::Customers => SAMPLE_CUSTOMERS,
        TableName::Products => SAMPLE_PRODUCTS,
        TableName::Sales => SAMPLE_SALES,
        TableName::SaleLines => SAMPLE_SALE_LINES,
    }
}

/// Writes `contents` as the default file of `table` inside `dir`.
pub fn write_table(dir: &Path, table: TableName, contents: &str) -> Result<()> {
    fs::write(dir.join(table.default_file_name()), contents)?;
    Ok(())
}

/// Writes all four sample files into `dir`.
pub fn write_sample_dataset(dir: &Path) -> Result<()> {
    write_sample_dataset_except(dir, &[])
}

/// Writes the sample files into `dir`, leaving out the listed tables.
pub fn write_sample_dataset_except(dir: &Path, skip: &[TableName]) -> Result<()> {
    for table in TableName::ALL {
        if !skip.contains(&table) {
            write_table(dir, table, sample_csv(table))?;
        }
    }
    Ok(())
}

/// A session reading from `dir` with default settings and one partition.
pub fn session_for(dir: &Path) -> Result<AnalysisSession> {
    let mut config = AnalyticsConfig::default().with_data_dir(dir);
    config.context.target_partitions = 1;
    AnalysisSession::new(config)
}
