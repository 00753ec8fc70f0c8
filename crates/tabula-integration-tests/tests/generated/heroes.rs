// Generated by tabula from Heroes.csv. Do not edit.

pub mod game {
    pub mod data {
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HeroesNames {
            Warrior = 0,
            Mage = 1,
            Rogue = 2,
        }

        impl ::tabula_core::record::TableKey for HeroesNames {
            const NAMES: &'static [&'static str] = &["Warrior", "Mage", "Rogue"];

            fn ordinal(self) -> usize {
                self as usize
            }
        }

        #[allow(non_snake_case)]
        #[derive(Debug, Clone)]
        pub struct HeroesEntry {
            name: String,
            level: i32,
            speed: f32,
            bonus: Vec<f32>,
            spawn: ::tabula_core::value::Vector3,
            grid: ::tabula_core::value::Vector2Int,
            rarity: crate::Rarity,
            icon: Option<::tabula_core::value::AssetHandle>,
            drops: Vec<Vec<i32>>,
            gold: ::tabula_core::rust_decimal::Decimal,
            elite: bool,
        }

        #[allow(non_snake_case)]
        impl HeroesEntry {
            pub fn Name(&self) -> &str {
                &self.name
            }

            pub fn Level(&self) -> i32 {
                self.level
            }

            pub fn Speed(&self) -> f32 {
                self.speed
            }

            pub fn Bonus(&self) -> &[f32] {
                &self.bonus
            }

            pub fn Spawn(&self) -> ::tabula_core::value::Vector3 {
                self.spawn
            }

            pub fn Grid(&self) -> ::tabula_core::value::Vector2Int {
                self.grid
            }

            pub fn Rarity(&self) -> crate::Rarity {
                self.rarity
            }

            pub fn Icon(&self) -> Option<&::tabula_core::value::AssetHandle> {
                self.icon.as_ref()
            }

            pub fn Drops(&self) -> &[Vec<i32>] {
                &self.drops
            }

            pub fn Gold(&self) -> ::tabula_core::rust_decimal::Decimal {
                self.gold
            }

            pub fn Elite(&self) -> bool {
                self.elite
            }
        }

        impl ::tabula_core::record::Record for HeroesEntry {
            type Key = HeroesNames;

            const TABLE_NAME: &'static str = "Heroes";
            const FIELDS: &'static [&'static str] = &["Name", "Level", "Speed", "Bonus", "Spawn", "Grid", "Rarity", "Icon", "Drops", "Gold", "Elite"];

            fn from_entry(entry: &::tabula_core::table::Entry) -> Result<Self, ::tabula_core::record::DecodeError> {
                Ok(Self {
                    name: ::tabula_core::record::decode::<String>(entry.field(0)?)?,
                    level: ::tabula_core::record::decode::<i32>(entry.field(1)?)?,
                    speed: ::tabula_core::record::decode::<f32>(entry.field(2)?)?,
                    bonus: ::tabula_core::record::decode_list(entry.field(3)?, |v| ::tabula_core::record::decode::<f32>(v))?,
                    spawn: ::tabula_core::record::decode::<::tabula_core::value::Vector3>(entry.field(4)?)?,
                    grid: ::tabula_core::record::decode::<::tabula_core::value::Vector2Int>(entry.field(5)?)?,
                    rarity: ::tabula_core::record::decode_enum::<crate::Rarity>(entry.field(6)?)?,
                    icon: ::tabula_core::record::decode::<Option<::tabula_core::value::AssetHandle>>(entry.field(7)?)?,
                    drops: ::tabula_core::record::decode_list(entry.field(8)?, |v| ::tabula_core::record::decode_list(v, |v| ::tabula_core::record::decode::<i32>(v)))?,
                    gold: ::tabula_core::record::decode::<::tabula_core::rust_decimal::Decimal>(entry.field(9)?)?,
                    elite: ::tabula_core::record::decode::<bool>(entry.field(10)?)?,
                })
            }
        }

        pub type Heroes = ::tabula_core::record::TypedTable<HeroesEntry>;
    }
}
