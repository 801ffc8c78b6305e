use std::marker::PhantomData;

/// Value type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
	Bool,
	Int,
	String,
	/// A string restricted to the listed values.
	Enum(&'static [&'static str]),
}

impl core::fmt::Display for PropertyType {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			PropertyType::Bool => f.write_str("a boolean"),
			PropertyType::Int => f.write_str("an integer"),
			PropertyType::String => f.write_str("a string"),
			PropertyType::Enum(values) => write!(f, "one of {values:?}"),
		}
	}
}

/// A resolved property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
	Bool(bool),
	Int(i64),
	String(String),
}

impl PropertyValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			PropertyValue::Bool(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			PropertyValue::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			PropertyValue::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			PropertyValue::Bool(_) => "bool",
			PropertyValue::Int(_) => "int",
			PropertyValue::String(_) => "string",
		}
	}

	/// Checks the value against `ty`, returning a reason on mismatch.
	pub(crate) fn check(&self, ty: PropertyType) -> Result<(), String> {
		match (ty, self) {
			(PropertyType::Bool, PropertyValue::Bool(_))
			| (PropertyType::Int, PropertyValue::Int(_))
			| (PropertyType::String, PropertyValue::String(_)) => Ok(()),
			(PropertyType::Enum(values), PropertyValue::String(v)) => {
				if values.contains(&v.as_str()) {
					Ok(())
				} else {
					Err(format!("`{v}` is not one of {values:?}"))
				}
			}
			_ => Err(format!("expected {ty}, got {}", self.type_name())),
		}
	}

	/// Parses `value` according to `ty`.
	pub(crate) fn parse(value: &str, ty: PropertyType) -> Result<Self, String> {
		let parsed = match ty {
			PropertyType::Bool => PropertyValue::Bool(parse_bool(value)?),
			PropertyType::Int => PropertyValue::Int(
				value
					.trim()
					.parse::<i64>()
					.map_err(|_| format!("invalid integer: '{value}'"))?,
			),
			PropertyType::String | PropertyType::Enum(_) => PropertyValue::String(value.to_string()),
		};
		parsed.check(ty)?;
		Ok(parsed)
	}
}

fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(format!(
			"invalid boolean: '{value}' (expected true/false, yes/no, on/off, 1/0)"
		)),
	}
}

/// Const-constructible default of a [`PropertyDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyDefault {
	Bool(bool),
	Int(i64),
	Str(&'static str),
}

impl PropertyDefault {
	pub fn to_value(self) -> PropertyValue {
		match self {
			PropertyDefault::Bool(v) => PropertyValue::Bool(v),
			PropertyDefault::Int(v) => PropertyValue::Int(v),
			PropertyDefault::Str(v) => PropertyValue::String(v.to_string()),
		}
	}
}

/// Static definition of a configuration property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
	/// Dotted name, e.g. `sched.runner`.
	pub name: &'static str,
	pub description: &'static str,
	pub ty: PropertyType,
	pub default: PropertyDefault,
}

impl PropertyDef {
	pub const fn new(
		name: &'static str,
		description: &'static str,
		ty: PropertyType,
		default: PropertyDefault,
	) -> Self {
		Self {
			name,
			description,
			ty,
			default,
		}
	}
}

mod sealed {
	pub trait Sealed {}
	impl Sealed for bool {}
	impl Sealed for i64 {}
	impl Sealed for String {}
	impl Sealed for super::super::RunnerMode {}
}

/// Rust types a property can be read as.
pub trait FromPropertyValue: sealed::Sealed + Sized {
	fn from_value(value: &PropertyValue) -> Option<Self>;
}

impl FromPropertyValue for bool {
	fn from_value(value: &PropertyValue) -> Option<Self> {
		value.as_bool()
	}
}

impl FromPropertyValue for i64 {
	fn from_value(value: &PropertyValue) -> Option<Self> {
		value.as_int()
	}
}

impl FromPropertyValue for String {
	fn from_value(value: &PropertyValue) -> Option<Self> {
		value.as_str().map(str::to_string)
	}
}

/// Typed handle to a property definition.
pub struct Property<T: FromPropertyValue> {
	def: &'static PropertyDef,
	_marker: PhantomData<fn() -> T>,
}

impl<T: FromPropertyValue> Clone for Property<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T: FromPropertyValue> Copy for Property<T> {}

impl<T: FromPropertyValue> Property<T> {
	pub const fn new(def: &'static PropertyDef) -> Self {
		Self {
			def,
			_marker: PhantomData,
		}
	}

	pub fn def(&self) -> &'static PropertyDef {
		self.def
	}

	pub fn name(&self) -> &'static str {
		self.def.name
	}

	/// The definition's default, read as `T`.
	///
	/// # Panics
	///
	/// Panics if the default cannot be read as `T`, which means the handle was declared with
	/// the wrong type.
	pub fn default_value(&self) -> T {
		T::from_value(&self.def.default.to_value()).unwrap_or_else(|| {
			panic!(
				"property `{}` cannot be read as {}",
				self.def.name,
				std::any::type_name::<T>()
			)
		})
	}
}

impl<T: FromPropertyValue> core::fmt::Debug for Property<T> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("Property").field(&self.def.name).finish()
	}
}
