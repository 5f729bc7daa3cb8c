use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub type Point = Point3<f64>;

macro_rules! define_elements {
    ($($symbol:ident = $number:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
        #[repr(u8)]
        pub enum Element {
            $($symbol = $number,)+
            Unknown = 0,
        }

        const PERIODIC_TABLE: &[Element] = &[$(Element::$symbol),+];

        impl Element {
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Element::$symbol => stringify!($symbol),)+
                    Element::Unknown => "Unknown",
                }
            }
        }
    };
}

define_elements! {
    H = 1, He = 2, Li = 3, Be = 4, B = 5, C = 6, N = 7, O = 8, F = 9, Ne = 10,
    Na = 11, Mg = 12, Al = 13, Si = 14, P = 15, S = 16, Cl = 17, Ar = 18, K = 19, Ca = 20,
    Sc = 21, Ti = 22, V = 23, Cr = 24, Mn = 25, Fe = 26, Co = 27, Ni = 28, Cu = 29, Zn = 30,
    Ga = 31, Ge = 32, As = 33, Se = 34, Br = 35, Kr = 36, Rb = 37, Sr = 38, Y = 39, Zr = 40,
    Nb = 41, Mo = 42, Tc = 43, Ru = 44, Rh = 45, Pd = 46, Ag = 47, Cd = 48, In = 49, Sn = 50,
    Sb = 51, Te = 52, I = 53, Xe = 54, Cs = 55, Ba = 56, La = 57, Ce = 58, Pr = 59, Nd = 60,
    Pm = 61, Sm = 62, Eu = 63, Gd = 64, Tb = 65, Dy = 66, Ho = 67, Er = 68, Tm = 69, Yb = 70,
    Lu = 71, Hf = 72, Ta = 73, W = 74, Re = 75, Os = 76, Ir = 77, Pt = 78, Au = 79, Hg = 80,
    Tl = 81, Pb = 82, Bi = 83, Po = 84, At = 85, Rn = 86, Fr = 87, Ra = 88, Ac = 89, Th = 90,
    Pa = 91, U = 92, Np = 93, Pu = 94, Am = 95, Cm = 96, Bk = 97, Cf = 98, Es = 99, Fm = 100,
    Md = 101, No = 102, Lr = 103, Rf = 104, Db = 105, Sg = 106, Bh = 107, Hs = 108, Mt = 109,
    Ds = 110, Rg = 111, Cn = 112, Nh = 113, Fl = 114, Mc = 115, Lv = 116, Ts = 117, Og = 118,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Element {
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn from_atomic_number(number: u8) -> Option<Element> {
        PERIODIC_TABLE.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }

    pub fn is_heavy_atom(&self) -> bool {
        !self.is_hydrogen()
    }

    /// Whether the element belongs to the fixed set of metals treated as coordination
    /// centers rather than covalent partners.
    pub fn is_metal(&self) -> bool {
        self.common_oxidation_state().is_some()
    }

    /// Most common oxidation state of the element as a free ion in biomolecular
    /// structures. `None` for every element outside the metal set.
    pub fn common_oxidation_state(&self) -> Option<i8> {
        match self {
            Element::Li | Element::Na | Element::K | Element::Rb | Element::Cs => Some(1),
            Element::Ag | Element::Au | Element::Tl => Some(1),
            Element::Be | Element::Mg | Element::Ca | Element::Sr | Element::Ba => Some(2),
            Element::Mn
            | Element::Fe
            | Element::Co
            | Element::Ni
            | Element::Cu
            | Element::Zn
            | Element::Cd
            | Element::Hg
            | Element::Pd
            | Element::Pt
            | Element::Sn
            | Element::Pb => Some(2),
            Element::Al | Element::Ga | Element::In | Element::Cr => Some(3),
            Element::La
            | Element::Ce
            | Element::Pr
            | Element::Nd
            | Element::Sm
            | Element::Eu
            | Element::Gd
            | Element::Tb
            | Element::Dy
            | Element::Ho
            | Element::Er
            | Element::Tm
            | Element::Yb
            | Element::Lu => Some(3),
            _ => None,
        }
    }
}

impl BondOrder {
    pub fn value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    pub fn is_aromatic(&self) -> bool {
        matches!(self, BondOrder::Aromatic)
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for BondOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "1.0" | "Single" => Ok(BondOrder::Single),
            "2" | "2.0" | "Double" => Ok(BondOrder::Double),
            "3" | "3.0" | "Triple" => Ok(BondOrder::Triple),
            "1.5" | "Aromatic" => Ok(BondOrder::Aromatic),
            _ => Err(format!("Invalid bond order: {}", s)),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = String;

    /// Parses an atomic number or a case-insensitive symbol (PDB element columns are
    /// upper-case, e.g. `ZN`). Unrecognized input maps to [`Element::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(number) = s.parse::<u8>() {
            return Ok(Element::from_atomic_number(number).unwrap_or(Element::Unknown));
        }

        Ok(PERIODIC_TABLE
            .iter()
            .copied()
            .find(|element| element.symbol().eq_ignore_ascii_case(s))
            .unwrap_or(Element::Unknown))
    }
}
