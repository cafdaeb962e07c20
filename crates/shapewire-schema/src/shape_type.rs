/// Closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Blob,
    Boolean,
    String,
    Timestamp,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Document,
    Double,
    BigDecimal,
    BigInteger,
    Enum,
    IntEnum,
    List,
    Set,
    Map,
    Structure,
    Union,
    Member,
    Service,
    Resource,
    Operation,
}

impl ShapeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Timestamp => "timestamp",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Document => "document",
            Self::Double => "double",
            Self::BigDecimal => "bigDecimal",
            Self::BigInteger => "bigInteger",
            Self::Enum => "enum",
            Self::IntEnum => "intEnum",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Structure => "structure",
            Self::Union => "union",
            Self::Member => "member",
            Self::Service => "service",
            Self::Resource => "resource",
            Self::Operation => "operation",
        }
    }

    /// Shapes that own members.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::List | Self::Set | Self::Map | Self::Structure | Self::Union
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Integer
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::BigDecimal
                | Self::BigInteger
                | Self::IntEnum
        )
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
