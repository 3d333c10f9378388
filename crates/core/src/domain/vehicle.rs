use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleMake {
    Bmw,
    Opel,
    Toyota,
    Renault,
}

impl VehicleMake {
    pub const ALL: &'static [Self] = &[Self::Bmw, Self::Opel, Self::Toyota, Self::Renault];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bmw => "BMW",
            Self::Opel => "Opel",
            Self::Toyota => "Toyota",
            Self::Renault => "Renault",
        }
    }

    /// Models offered for this make, in menu order.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Self::Bmw => &["Convertible", "Gran Turismo", "X6", "Z4 Roadster"],
            Self::Opel => &["Corsa", "Astra", "Vectra"],
            Self::Toyota => &["Auris", "Yaris", "Corolla", "Avensis"],
            Self::Renault => &["Fleunce", "Megane", "Clio"],
        }
    }

    /// The make a model belongs to, if it is one of the catalog models.
    pub fn of_model(model: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|make| make.models().contains(&model))
    }

    /// Summary cell text, e.g. `BMW-X6`.
    pub fn describe(self, model: &str) -> String {
        format!("{}-{model}", self.label())
    }
}

impl fmt::Display for VehicleMake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
