//! Platform tunables registry
//!
//! A static, read-only table of OS-specific runtime flags plus the
//! platform-scoped defaults for flags declared elsewhere. Entries are laid
//! out with the same shape as the runtime's flag headers: kind, type, name,
//! default, description.

use std::fmt;

/// Visibility class of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// Settable only in development builds
    Develop,
    /// Development flag with a platform-dependent default
    DevelopPd,
    /// Settable in product builds
    Product,
    /// Product flag with a platform-dependent default
    ProductPd,
    /// Product flag that requires unlocking diagnostic options
    Diagnostic,
    /// Available in every build except product
    NotProduct,
}

impl FlagKind {
    /// Whether the flag can be set in a product build.
    pub fn in_product(self) -> bool {
        matches!(self, FlagKind::Product | FlagKind::ProductPd | FlagKind::Diagnostic)
    }
}

/// Value type of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagType {
    /// `bool`
    Bool,
    /// Signed machine word
    Intx,
    /// Unsigned machine word
    Uintx,
    /// `double`
    Double,
    /// C string
    Ccstr,
}

/// A typed default value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagValue {
    /// `bool`
    Bool(bool),
    /// Signed machine word
    Intx(i64),
    /// Unsigned machine word
    Uintx(u64),
    /// `double`
    Double(f64),
    /// C string
    Ccstr(&'static str),
}

impl FlagValue {
    /// Type of this value.
    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Bool(_) => FlagType::Bool,
            FlagValue::Intx(_) => FlagType::Intx,
            FlagValue::Uintx(_) => FlagType::Uintx,
            FlagValue::Double(_) => FlagType::Double,
            FlagValue::Ccstr(_) => FlagType::Ccstr,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Intx(i) => write!(f, "{}", i),
            FlagValue::Uintx(u) => write!(f, "{}", u),
            FlagValue::Double(d) => write!(f, "{}", d),
            FlagValue::Ccstr(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A flag declared by this platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunable {
    /// Visibility class
    pub kind: FlagKind,
    /// Value type
    pub ty: FlagType,
    /// Flag name
    pub name: &'static str,
    /// Default value
    pub default: FlagValue,
    /// Human-readable description
    pub description: &'static str,
}

/// Platform default for a flag declared elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformDefault {
    /// Value type
    pub ty: FlagType,
    /// Flag name
    pub name: &'static str,
    /// Default on this platform
    pub value: FlagValue,
}

macro_rules! os_flags {
    ($($kind:ident($ty:ident, $name:ident, $default:expr, $desc:literal);)*) => {
        &[$(Tunable {
            kind: FlagKind::$kind,
            ty: FlagType::$ty,
            name: stringify!($name),
            default: FlagValue::$ty($default),
            description: $desc,
        },)*]
    };
}

macro_rules! pd_globals {
    ($($ty:ident $name:ident = $value:expr;)*) => {
        &[$(PlatformDefault {
            ty: FlagType::$ty,
            name: stringify!($name),
            value: FlagValue::$ty($value),
        },)*]
    };
}

/// Solaris-only flags.
pub const SOLARIS_FLAGS: &[Tunable] = os_flags! {
    Product(Bool, UseISM, false,
            "Use Intimate Shared Memory (Solaris Only)");
    Product(Bool, UsePermISM, false,
            "Obsolete flag for compatibility (same as UseISM)");
    Product(Bool, UseMPSS, true,
            "Use Multiple Page Size Support (Solaris 9 Only)");
    Product(Bool, UseExtendedFileIO, true,
            "Enable workaround for limitations of stdio FILE structure");
};

/// Solaris defaults for flags available on every platform.
pub const SOLARIS_DEFAULTS: &[PlatformDefault] = pd_globals! {
    Bool UseLargePages = true;
    Bool UseOSErrorReporting = false;
    Bool UseThreadPriorities = false;
};

/// Read-only view over one platform's flag tables.
#[derive(Debug, Clone, Copy)]
pub struct TunablesRegistry {
    platform: &'static str,
    flags: &'static [Tunable],
    defaults: &'static [PlatformDefault],
}

static SOLARIS: TunablesRegistry = TunablesRegistry {
    platform: "solaris",
    flags: SOLARIS_FLAGS,
    defaults: SOLARIS_DEFAULTS,
};

impl TunablesRegistry {
    /// The Solaris tables.
    pub fn solaris() -> &'static TunablesRegistry {
        &SOLARIS
    }

    /// Platform name.
    pub fn platform(&self) -> &'static str {
        self.platform
    }

    /// Flags declared by this platform, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static Tunable> {
        self.flags.iter()
    }

    /// Platform defaults, in declaration order.
    pub fn platform_defaults(&self) -> impl Iterator<Item = &'static PlatformDefault> {
        self.defaults.iter()
    }

    /// Number of flags declared by this platform.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether this platform declares no flags.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Look up a platform flag by name.
    pub fn get(&self, name: &str) -> Option<&'static Tunable> {
        self.flags.iter().find(|t| t.name == name)
    }

    /// Flags of one visibility class.
    pub fn by_kind(&self, kind: FlagKind) -> impl Iterator<Item = &'static Tunable> {
        self.flags.iter().filter(move |t| t.kind == kind)
    }

    /// Platform default for a flag declared elsewhere.
    pub fn platform_default(&self, name: &str) -> Option<&'static PlatformDefault> {
        self.defaults.iter().find(|d| d.name == name)
    }

    /// Default value on this platform, from either table.
    pub fn effective_default(&self, name: &str) -> Option<FlagValue> {
        self.get(name)
            .map(|t| t.default)
            .or_else(|| self.platform_default(name).map(|d| d.value))
    }
}
