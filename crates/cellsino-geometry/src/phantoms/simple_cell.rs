//! A cell made of a cytoplasm, a nucleus, and two nucleoli.
//!
//! Configuration:
//! - a cytoplasm sphere (no fluorescence) containing
//!   - a nucleus sphere with a fluorescent shell, containing
//!     - two small nucleoli.
//!
//! Since rasterisation and propagation compose elements additively (in
//! index offsets) or multiplicatively (in transmitted fields), the inner
//! structures carry *differences* with respect to the structure enclosing
//! them. The nucleus shell is modelled as a bright nucleus sphere minus a
//! slightly smaller sphere at the medium index whose brightness is
//! `nucleus_fl - nucleus_shell_fl`.

use serde::{Deserialize, Serialize};

use crate::elements::Element;
use crate::phantom::Phantom;

/// Parameters of the simple cell phantom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleCell {
    pub cytoplasm_index: f64,
    pub nucleus_index: f64,
    pub nucleoli_index: f64,
    pub medium_index: f64,
    pub cytoplasm_fl: f64,
    pub nucleus_fl: f64,
    pub nucleus_shell_fl: f64,
    pub nucleoli_fl: f64,
}

impl Default for SimpleCell {
    fn default() -> Self {
        Self {
            cytoplasm_index: 1.365,
            nucleus_index: 1.360,
            nucleoli_index: 1.387,
            medium_index: 1.335,
            cytoplasm_fl: 0.0,
            nucleus_fl: 3.0,
            nucleus_shell_fl: 10.0,
            nucleoli_fl: 0.0,
        }
    }
}

impl SimpleCell {
    /// Cytoplasm radius (m).
    pub const CYTOPLASM_RADIUS: f64 = 5.5e-6;
    /// Nucleus radius (m).
    pub const NUCLEUS_RADIUS: f64 = 4e-6;
    /// Inner radius of the fluorescent nucleus shell (m).
    pub const NUCLEUS_CORE_RADIUS: f64 = 3.8e-6;
    /// Nucleolus radius (m).
    pub const NUCLEOLUS_RADIUS: f64 = 1.5e-6;

    /// Build the phantom.
    pub fn build(&self) -> Phantom {
        let nm = self.medium_index;
        let nucleus_center = [0.0, 1e-6, 1e-6];

        let nucleoli_fl = self.nucleoli_fl - self.nucleus_fl;
        let nucleoli_index = nm + (self.nucleoli_index - self.nucleus_index);

        let mut ph = Phantom::new(nm);
        ph.append(Element::sphere(
            nucleoli_index,
            nm,
            nucleoli_fl,
            [-0.25e-6, 2e-6, 2e-6],
            Self::NUCLEOLUS_RADIUS,
        ));
        ph.append(Element::sphere(
            nucleoli_index,
            nm,
            nucleoli_fl,
            [0.25e-6, -1e-6, 2e-6],
            Self::NUCLEOLUS_RADIUS,
        ));
        ph.append(Element::sphere(
            nm + (self.nucleus_index - self.cytoplasm_index),
            nm,
            self.nucleus_shell_fl,
            nucleus_center,
            Self::NUCLEUS_RADIUS,
        ));
        ph.append(Element::sphere(
            nm,
            nm,
            self.nucleus_fl - self.nucleus_shell_fl,
            nucleus_center,
            Self::NUCLEUS_CORE_RADIUS,
        ));
        ph.append(Element::sphere(
            self.cytoplasm_index,
            nm,
            self.cytoplasm_fl,
            [0.0, 0.0, 0.0],
            Self::CYTOPLASM_RADIUS,
        ));
        ph
    }
}
