//! Column data types as they appear in cast targets and partition declarations.
//!
//! Types come from two places: the `cast_type` object of a serialized cast
//! (`{"id": "DECIMAL", "type_info": {...}}`) and SQL type names written by a
//! user (`dt:DATE`, `hive_types = {'p': VARCHAR}`). Both resolve to
//! [`DataType`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::node::{Fields, Node};
use crate::transform::{collect_reference_casts, collect_references, column_names};

static DECIMAL_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:DECIMAL|NUMERIC)\s*\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)$").expect("DECIMAL type pattern")
});

/// A column data type.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Unknown type (a reference seen without a cast)
    Null,
    Boolean,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal { width: u8, scale: u8 },
    Varchar,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Interval,
    List(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Struct(StructType),
}

/// A named field of a [`StructType`].
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
}

/// An ordered list of named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

/// A partition column and the type its raw path values are cast to.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionColumn {
    pub name: String,
    pub data_type: DataType,
}

impl DataType {
    /// The type id written into a serialized `cast_type`.
    pub fn id(&self) -> &'static str {
        match self {
            DataType::Null => "NULL",
            DataType::Boolean => "BOOLEAN",
            DataType::Bit => "BIT",
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Decimal { .. } => "DECIMAL",
            DataType::Varchar => "VARCHAR",
            DataType::Blob => "BLOB",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            DataType::Interval => "INTERVAL",
            DataType::List(_) => "LIST",
            DataType::Map(_, _) => "MAP",
            DataType::Struct(_) => "STRUCT",
        }
    }

    /// Reads a serialized type object (`{"id": ..., "type_info": ...}`).
    pub fn from_type_node(node: &Node) -> Result<DataType> {
        let id = node.require("id")?.as_str().ok_or_else(|| {
            Error::MalformedTree("type id must be a string".to_string())
        })?;
        let data_type = match id {
            "NULL" | "SQLNULL" => DataType::Null,
            "BOOLEAN" => DataType::Boolean,
            "BIT" => DataType::Bit,
            "TINYINT" => DataType::TinyInt,
            "SMALLINT" => DataType::SmallInt,
            "INTEGER" => DataType::Integer,
            "BIGINT" => DataType::BigInt,
            "FLOAT" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "VARCHAR" => DataType::Varchar,
            "BLOB" => DataType::Blob,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "TIMESTAMP" | "TIMESTAMP_MS" | "TIMESTAMP_NS" | "TIMESTAMP_SEC" => DataType::Timestamp,
            "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP_TZ" => DataType::TimestampTz,
            "INTERVAL" => DataType::Interval,
            "DECIMAL" => {
                let info = node.require("type_info")?;
                let width = info.require("width")?.as_i64();
                let scale = info.require("scale")?.as_i64();
                match (width, scale) {
                    (Some(width), Some(scale)) => DataType::Decimal {
                        width: narrow(width, "DECIMAL width")?,
                        scale: narrow(scale, "DECIMAL scale")?,
                    },
                    _ => {
                        return Err(Error::MalformedTree(
                            "DECIMAL width and scale must be integers".to_string(),
                        ));
                    }
                }
            }
            "LIST" => {
                let child = node.require("type_info")?.require("child_type")?;
                DataType::List(Box::new(DataType::from_type_node(child)?))
            }
            "MAP" => {
                let entry = node.require("type_info")?.require("child_type")?;
                match DataType::from_type_node(entry)? {
                    DataType::Struct(StructType { fields }) if fields.len() == 2 => {
                        if let [key, value] = fields.as_slice() {
                            DataType::Map(
                                Box::new(key.data_type.clone()),
                                Box::new(value.data_type.clone()),
                            )
                        } else {
                            return Err(Error::MalformedTree(
                                "MAP entry type must have two fields".to_string(),
                            ));
                        }
                    }
                    other => {
                        return Err(Error::MalformedTree(format!(
                            "MAP entry type must be a two-field STRUCT, got {}",
                            other.to_sql()
                        )));
                    }
                }
            }
            "STRUCT" => {
                let children = node.require("type_info")?.require("child_types")?;
                let children = children.as_array().ok_or_else(|| {
                    Error::MalformedTree("STRUCT child_types must be an array".to_string())
                })?;
                let mut result = StructType::default();
                for child in children {
                    let name = child.require("first")?.as_str().ok_or_else(|| {
                        Error::MalformedTree("STRUCT field name must be a string".to_string())
                    })?;
                    let data_type = DataType::from_type_node(child.require("second")?)?;
                    result.fields.push(StructField {
                        name: name.to_string(),
                        data_type,
                    });
                }
                DataType::Struct(result)
            }
            other => {
                return Err(Error::UnsupportedShape(format!("data type {} not supported", other)));
            }
        };
        Ok(data_type)
    }

    /// Writes the serialized type object used as a cast target.
    pub fn to_type_node(&self) -> Node {
        let type_info = match self {
            DataType::Decimal { width, scale } => Node::object(
                Fields::new()
                    .with("type", "DECIMAL_TYPE_INFO")
                    .with("alias", "")
                    .with("width", *width as i64)
                    .with("scale", *scale as i64),
            ),
            DataType::List(child) => Node::object(
                Fields::new()
                    .with("type", "LIST_TYPE_INFO")
                    .with("alias", "")
                    .with("child_type", child.to_type_node()),
            ),
            DataType::Map(key, value) => {
                let entry = StructType::default()
                    .add("key", key.as_ref().clone())
                    .add("value", value.as_ref().clone());
                Node::object(
                    Fields::new()
                        .with("type", "LIST_TYPE_INFO")
                        .with("alias", "")
                        .with("child_type", DataType::Struct(entry).to_type_node()),
                )
            }
            DataType::Struct(fields) => {
                let children = fields
                    .fields
                    .iter()
                    .map(|f| {
                        Node::object(
                            Fields::new()
                                .with("first", f.name.as_str())
                                .with("second", f.data_type.to_type_node()),
                        )
                    })
                    .collect::<Vec<_>>();
                Node::object(
                    Fields::new()
                        .with("type", "STRUCT_TYPE_INFO")
                        .with("alias", "")
                        .with("child_types", Node::array(children)),
                )
            }
            _ => Node::Null,
        };
        Node::object(Fields::new().with("id", self.id()).with("type_info", type_info))
    }

    /// Parses a SQL type name such as `INT`, `STRING`, `DECIMAL(18,3)` or `BIGINT[]`.
    ///
    /// Nested `STRUCT(...)` and `MAP(...)` declarations are not accepted here;
    /// those only arrive through serialized cast targets.
    pub fn parse(name: &str) -> Result<DataType> {
        let upper = name.trim().to_ascii_uppercase();
        if let Some(inner) = upper.strip_suffix("[]") {
            return Ok(DataType::List(Box::new(DataType::parse(inner)?)));
        }

        if let Some(caps) = DECIMAL_TYPE.captures(&upper) {
            let width = caps[1]
                .parse::<i64>()
                .map_err(|_| type_name_error(name))?;
            let scale = match caps.get(2) {
                Some(scale) => scale.as_str().parse::<i64>().map_err(|_| type_name_error(name))?,
                None => 0,
            };
            return Ok(DataType::Decimal {
                width: narrow(width, "DECIMAL width")?,
                scale: narrow(scale, "DECIMAL scale")?,
            });
        }

        let data_type = match upper.as_str() {
            "NULL" => DataType::Null,
            "BOOLEAN" | "BOOL" | "LOGICAL" => DataType::Boolean,
            "BIT" | "BITSTRING" => DataType::Bit,
            "TINYINT" | "INT1" => DataType::TinyInt,
            "SMALLINT" | "INT2" | "SHORT" => DataType::SmallInt,
            "INTEGER" | "INT" | "INT4" | "SIGNED" => DataType::Integer,
            "BIGINT" | "INT8" | "LONG" => DataType::BigInt,
            "FLOAT" | "FLOAT4" | "REAL" => DataType::Float,
            "DOUBLE" | "FLOAT8" => DataType::Double,
            "DECIMAL" | "NUMERIC" => DataType::Decimal { width: 18, scale: 3 },
            "VARCHAR" | "STRING" | "TEXT" | "CHAR" | "BPCHAR" => DataType::Varchar,
            "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => DataType::Blob,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMP_NTZ" => DataType::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => DataType::TimestampTz,
            "INTERVAL" => DataType::Interval,
            _ => {
                return Err(Error::UnsupportedShape(format!(
                    "data type {} not supported",
                    name.trim()
                )));
            }
        };
        Ok(data_type)
    }

    /// SQL spelling of the type.
    pub fn to_sql(&self) -> String {
        match self {
            DataType::Decimal { width, scale } => format!("DECIMAL({},{})", width, scale),
            DataType::TimestampTz => "TIMESTAMPTZ".to_string(),
            DataType::List(child) => format!("{}[]", child.to_sql()),
            DataType::Map(key, value) => format!("MAP({}, {})", key.to_sql(), value.to_sql()),
            DataType::Struct(fields) => fields.to_sql(),
            other => other.id().to_string(),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

impl StructType {
    /// Appends a field without checking for duplicates.
    pub fn add(mut self, name: &str, data_type: DataType) -> Self {
        self.fields.push(StructField {
            name: name.to_string(),
            data_type,
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.data_type)
    }

    /// Returns the existing field or inserts `data_type` under `name`.
    pub fn get_or_add(&mut self, name: &str, data_type: DataType) -> &mut DataType {
        let index = match self.fields.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(StructField {
                    name: name.to_string(),
                    data_type,
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[index].data_type
    }

    /// Adds a possibly nested field: `["c", "x"]` becomes `c STRUCT(x ...)`.
    ///
    /// An existing field keeps its type. An untyped intermediate field is
    /// promoted to a struct; any other intermediate type is a conflict.
    pub fn add_path(&mut self, names: &[String], data_type: DataType) -> Result<()> {
        let (last, parents) = match names.split_last() {
            Some(split) => split,
            None => return Err(Error::MalformedTree("empty column path".to_string())),
        };
        let mut current = self;
        for name in parents {
            let slot = current.get_or_add(name, DataType::Struct(StructType::default()));
            if *slot == DataType::Null {
                *slot = DataType::Struct(StructType::default());
            }
            current = match slot {
                DataType::Struct(inner) => inner,
                other => {
                    return Err(Error::UnsupportedShape(format!(
                        "column {} is {} and cannot hold field {}",
                        name,
                        other.to_sql(),
                        names.join(".")
                    )));
                }
            };
        }
        current.get_or_add(last, data_type);
        Ok(())
    }

    /// True when any field, at any depth, is still untyped.
    pub fn has_null_type(&self) -> bool {
        self.fields.iter().any(|f| match &f.data_type {
            DataType::Struct(inner) => inner.has_null_type(),
            DataType::Null => true,
            _ => false,
        })
    }

    pub fn to_sql(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|f| format!("\"{}\" {}", f.name, f.data_type.to_sql()))
            .collect::<Vec<_>>()
            .join(",");
        format!("STRUCT({})", fields)
    }
}

impl PartitionColumn {
    pub fn new(name: &str, data_type: DataType) -> Self {
        PartitionColumn {
            name: name.to_string(),
            data_type,
        }
    }

    /// Parses `name[:TYPE]`; the type defaults to VARCHAR.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlprune::types::{DataType, PartitionColumn};
    ///
    /// let dt = PartitionColumn::parse("dt:DATE").unwrap();
    /// assert_eq!(dt, PartitionColumn::new("dt", DataType::Date));
    ///
    /// let p = PartitionColumn::parse("p").unwrap();
    /// assert_eq!(p.data_type, DataType::Varchar);
    /// ```
    pub fn parse(spec: &str) -> Result<PartitionColumn> {
        let (name, type_name) = match spec.split_once(':') {
            Some((name, type_name)) => (name.trim(), Some(type_name.trim())),
            None => (spec.trim(), None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) || type_name == Some("") {
            return Err(Error::UnsupportedShape(format!(
                "partition column '{}' must look like name or name:TYPE",
                spec
            )));
        }
        let data_type = match type_name {
            Some(type_name) => DataType::parse(type_name)?,
            None => DataType::Varchar,
        };
        Ok(PartitionColumn::new(name, data_type))
    }
}

/// Infers the schema a statement expects from the casts applied to its columns.
///
/// `select cast(a as int) from t where cast(c.x as bigint) = 10` yields
/// `STRUCT(a INTEGER, c STRUCT(x BIGINT))`. Columns that are never cast are
/// added with [`DataType::Null`]. The select list, where clause and group
/// expressions are scanned, in that order.
pub fn infer_schema(statement: &Node) -> Result<StructType> {
    let mut schema = StructType::default();
    for field in ["select_list", "where_clause", "group_expressions"] {
        if let Some(node) = statement.get_present(field) {
            add_references(&mut schema, node)?;
        }
    }
    Ok(schema)
}

fn add_references(schema: &mut StructType, node: &Node) -> Result<()> {
    let casts = collect_reference_casts(node);
    for cast in &casts {
        let names = column_names(cast.require("child")?)?;
        let data_type = DataType::from_type_node(cast.require("cast_type")?)?;
        schema.add_path(&names, data_type)?;
    }

    let references = collect_references(node);
    if references.len() != casts.len() {
        for reference in &references {
            schema.add_path(&column_names(reference)?, DataType::Null)?;
        }
    }
    Ok(())
}

fn narrow(value: i64, what: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::TypeConversion {
        value: value.to_string(),
        target: what.to_string(),
    })
}

fn type_name_error(name: &str) -> Error {
    Error::UnsupportedShape(format!("data type {} not supported", name.trim()))
}
