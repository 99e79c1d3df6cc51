// 数据访问模块
// 实体定义与记录存取接口

pub mod entities;
pub mod store;

// Re-export store types
pub use store::address::{
    AddressStore, CityStore, DbAddressStore, DbCityStore, MemAddressStore, MemCityStore,
};
pub use store::db::DbRecordStore;
pub use store::mem::MemRecordStore;
pub use store::{
    AggregateSpec, DailyCount, GroupedAggregate, PayCountBand, RecordStore, RowPredicate,
    TimeField, UserQuery, UserSumField,
};
