// 派發契約 (ports) 與跨越契約的資料

pub mod model;
pub mod ports;
