//! SQL type vocabulary and its mapping onto target-neutral scalar types.

use crate::libs::schema::ColumnInfo;

/// Integer width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// Picks the narrowest width that holds `bits` of precision.
    pub fn from_precision(bits: i32) -> Self {
        match bits {
            b if b <= 0 => IntWidth::W64,
            b if b <= 16 => IntWidth::W16,
            b if b <= 32 => IntWidth::W32,
            _ => IntWidth::W64,
        }
    }
}

/// SQL type categories recognized by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer(IntWidth),
    Real,
    Double,
    Numeric,
    Money,
    Boolean,
    Text,
    Date,
    Time,
    TimeTz,
    Interval,
    Timestamp,
    TimestampTz,
    Bytea,
    Uuid,
    Json,
    /// `inet` and `cidr`.
    Inet,
    MacAddr,
    Array(Box<SqlType>),
    /// Anything else, kept verbatim (user-defined enums, ranges, geometry, ...).
    Unrecognized(String),
}

impl SqlType {
    /// Classifies a catalog type name.
    ///
    /// `udt_name` resolves `ARRAY` element types (`_int4` -> integer) and
    /// `precision` overrides the integer width implied by the name.
    pub fn parse(data_type: &str, udt_name: Option<&str>, precision: Option<i32>) -> Self {
        let normalized = normalize(data_type);

        if let Some(element) = normalized.strip_suffix("[]") {
            return SqlType::Array(Box::new(Self::parse(element, None, None)));
        }
        if normalized == "array" {
            let element = udt_name
                .and_then(|udt| udt.strip_prefix('_'))
                .map(|udt| Self::parse(udt, None, None))
                .unwrap_or_else(|| SqlType::Unrecognized(data_type.trim().to_string()));
            return SqlType::Array(Box::new(element));
        }

        let parsed = Self::parse_name(&normalized).unwrap_or_else(|| {
            // USER-DEFINED columns report the real type in udt_name.
            SqlType::Unrecognized(udt_name.unwrap_or(data_type).trim().to_string())
        });

        match (parsed, precision) {
            (SqlType::Integer(_), Some(bits)) => SqlType::Integer(IntWidth::from_precision(bits)),
            (parsed, _) => parsed,
        }
    }

    fn parse_name(name: &str) -> Option<Self> {
        let ty = match name {
            "smallint" | "int2" | "smallserial" | "serial2" => SqlType::Integer(IntWidth::W16),
            "integer" | "int" | "int4" | "serial" | "serial4" => SqlType::Integer(IntWidth::W32),
            "bigint" | "int8" | "bigserial" | "serial8" => SqlType::Integer(IntWidth::W64),
            "real" | "float4" => SqlType::Real,
            "double precision" | "float8" | "float" => SqlType::Double,
            "numeric" | "decimal" => SqlType::Numeric,
            "money" => SqlType::Money,
            "boolean" | "bool" => SqlType::Boolean,
            "text" | "character varying" | "varchar" | "character" | "char" | "bpchar"
            | "citext" | "name" => SqlType::Text,
            "date" => SqlType::Date,
            "time" | "time without time zone" => SqlType::Time,
            "time with time zone" | "timetz" => SqlType::TimeTz,
            "interval" => SqlType::Interval,
            "inet" | "cidr" => SqlType::Inet,
            "macaddr" => SqlType::MacAddr,
            "timestamp" | "timestamp without time zone" => SqlType::Timestamp,
            "timestamp with time zone" | "timestamptz" => SqlType::TimestampTz,
            "bytea" => SqlType::Bytea,
            "uuid" => SqlType::Uuid,
            "json" | "jsonb" => SqlType::Json,
            _ => return None,
        };
        Some(ty)
    }
}

/// Lower-cases and drops type modifiers: `VARCHAR(255)` -> `varchar`.
fn normalize(name: &str) -> String {
    let lowered = name.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut depth = 0usize;
    for c in lowered.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Language-neutral shape of a generated field's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Money,
    Bool,
    Text,
    Date,
    Time,
    TimeTz,
    Interval,
    Timestamp,
    TimestampTz,
    Bytes,
    Uuid,
    Json,
    Inet,
    MacAddr,
    List(Box<ScalarType>),
    /// Fallback for unrecognized SQL types; carries the SQL name.
    Raw(String),
}

impl ScalarType {
    pub fn is_timestamp(&self) -> bool {
        match self {
            ScalarType::Date
            | ScalarType::Time
            | ScalarType::TimeTz
            | ScalarType::Timestamp
            | ScalarType::TimestampTz => true,
            ScalarType::List(element) => element.is_timestamp(),
            _ => false,
        }
    }

    /// True for the fallback type, also inside lists.
    pub fn is_raw(&self) -> bool {
        match self {
            ScalarType::Raw(_) => true,
            ScalarType::List(element) => element.is_raw(),
            _ => false,
        }
    }
}

impl From<&SqlType> for ScalarType {
    fn from(sql_type: &SqlType) -> Self {
        match sql_type {
            SqlType::Integer(IntWidth::W16) => ScalarType::Int16,
            SqlType::Integer(IntWidth::W32) => ScalarType::Int32,
            SqlType::Integer(IntWidth::W64) => ScalarType::Int64,
            SqlType::Real => ScalarType::Float32,
            SqlType::Double => ScalarType::Float64,
            SqlType::Numeric => ScalarType::Decimal,
            SqlType::Money => ScalarType::Money,
            SqlType::Boolean => ScalarType::Bool,
            SqlType::Text => ScalarType::Text,
            SqlType::Date => ScalarType::Date,
            SqlType::Time => ScalarType::Time,
            SqlType::TimeTz => ScalarType::TimeTz,
            SqlType::Interval => ScalarType::Interval,
            SqlType::Timestamp => ScalarType::Timestamp,
            SqlType::TimestampTz => ScalarType::TimestampTz,
            SqlType::Bytea => ScalarType::Bytes,
            SqlType::Uuid => ScalarType::Uuid,
            SqlType::Json => ScalarType::Json,
            SqlType::Inet => ScalarType::Inet,
            SqlType::MacAddr => ScalarType::MacAddr,
            SqlType::Array(element) => ScalarType::List(Box::new(ScalarType::from(element.as_ref()))),
            SqlType::Unrecognized(name) => ScalarType::Raw(name.clone()),
        }
    }
}

/// Type Mapper output: the scalar plus whether it is wrapped for NULL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub scalar: ScalarType,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub fn is_raw(&self) -> bool {
        self.scalar.is_raw()
    }
}

/// Maps a parsed SQL type and nullability to a type descriptor. Total.
pub fn map(sql_type: &SqlType, nullable: bool) -> TypeDescriptor {
    TypeDescriptor {
        scalar: ScalarType::from(sql_type),
        nullable,
    }
}

/// Maps a bare SQL type name, e.g. `map_name("integer", false)`.
pub fn map_name(sql_type: &str, nullable: bool) -> TypeDescriptor {
    map(&SqlType::parse(sql_type, None, None), nullable)
}

/// Maps a catalog column, honoring its udt name and precision.
pub fn map_column(column: &ColumnInfo) -> TypeDescriptor {
    let sql_type = SqlType::parse(
        &column.sql_type,
        column.udt_name.as_deref(),
        column.precision,
    );
    map(&sql_type, column.is_nullable)
}
