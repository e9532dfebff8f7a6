pub mod equipment_set;
pub mod player_record;
pub mod rank;

pub use self::{
    equipment_set::{
        modification_level,
        EquipmentKind,
        EquipmentSet,
    },
    player_record::{
        kd_ratio,
        PartialRecord,
        PlayerRecord,
        RecordSource,
        UNKNOWN_GROUP,
    },
    rank::{
        FixedRank,
        Rank,
    },
};
