//! Rytov approximation for a homogeneous sphere.
//!
//! In the first-order Rytov approximation the transmitted field is
//! $u = u_0 \exp(\phi_R)$, where the complex phase $\phi_R$ follows from the
//! Fourier diffraction theorem. For a detector plane at distance $d$
//! downstream of the sphere centre,
//!
//! $$\hat\phi_R(k_x, k_y) = \frac{i}{2 k_z}\,
//!   \hat f\bigl(k_x, k_y, k_z - k_m\bigr)\, e^{i (k_z - k_m) d}$$
//!
//! with $k_z = \sqrt{k_m^2 - k_x^2 - k_y^2}$ and the object function
//! $f = k_m^2\bigl((n_s/n_m)^2 - 1\bigr)$ inside the sphere. The 3D Fourier
//! transform of a sphere is analytic:
//!
//! $$\hat f(q) = \Delta f \, \frac{4\pi\,(\sin qR - qR \cos qR)}{q^3}.$$
//!
//! Evanescent components ($k_x^2 + k_y^2 \ge k_m^2$) are dropped.
//!
//! The phase is computed on an internal square grid whose spacing is
//! `radius / radius_sampling`, centred on the sphere and twice as wide as the
//! detector, then resampled bilinearly onto the detector pixels. Choosing the
//! radius sampling in proportion to the sphere size keeps the internal grid,
//! and thus the cost, independent of how small the sphere is.

use std::f64::consts::PI;

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::provider::{OpticsError, SphereModel, SphereRequest};

/// Rytov model with bounds on the internal FFT grid.
#[derive(Debug, Clone, Copy)]
pub struct RytovModel {
    /// Smallest internal grid edge (samples).
    pub min_grid: usize,
    /// Largest internal grid edge (samples).
    pub max_grid: usize,
}

impl Default for RytovModel {
    fn default() -> Self {
        Self {
            min_grid: 64,
            max_grid: 4096,
        }
    }
}

impl RytovModel {
    /// Edge length and spacing (m) of the internal grid.
    fn internal_grid(&self, request: &SphereRequest) -> (usize, f64) {
        let mut spacing = match request.radius_sampling {
            Some(s) => request.radius / s,
            None => request.pixel_size,
        };
        let extent = *request.grid_size.iter().max().unwrap_or(&1) as f64 * request.pixel_size;
        // clamp before converting so extreme sampling cannot overflow
        let wanted = (2.0 * extent / spacing).ceil().min(self.max_grid as f64) as usize;
        let mut n = wanted.next_power_of_two().max(self.min_grid);
        if n > self.max_grid {
            n = self.max_grid;
            spacing = 2.0 * extent / n as f64;
            log::debug!(
                "Rytov grid capped at {n} samples, spacing widened to {spacing:.3e} m"
            );
        }
        (n, spacing)
    }
}

impl SphereModel for RytovModel {
    fn name(&self) -> &str {
        "rytov"
    }

    fn field(&self, request: &SphereRequest) -> Result<Array2<Complex64>, OpticsError> {
        request.validate()?;
        if request.is_degenerate() {
            return Ok(request.unit_field());
        }

        let (n, spacing) = self.internal_grid(request);
        let phase = rytov_phase(request, n, spacing);

        let [cx, cy] = request.center;
        let scale = request.pixel_size / spacing;
        let half = (n / 2) as f64 - 1.0;
        let dim = (request.grid_size[0], request.grid_size[1]);
        Ok(Array2::from_shape_fn(dim, |(x, y)| {
            let u = (x as f64 - cx) * scale;
            let v = (y as f64 - cy) * scale;
            if u.abs() > half || v.abs() > half {
                return Complex64::new(1.0, 0.0);
            }
            sample_bilinear(&phase, n, u, v).exp()
        }))
    }
}

/// 3D Fourier transform of the indicator function of a sphere of radius `r`.
fn sphere_transform(q: f64, r: f64) -> f64 {
    let qr = q * r;
    if qr < 1e-4 {
        4.0 / 3.0 * PI * r.powi(3) * (1.0 - qr * qr / 10.0)
    } else {
        4.0 * PI * (qr.sin() - qr * qr.cos()) / q.powi(3)
    }
}

/// Signed FFT frequency index (numpy `fftfreq` ordering).
fn fft_index(i: usize, n: usize) -> f64 {
    if i < n / 2 {
        i as f64
    } else {
        i as f64 - n as f64
    }
}

/// Complex Rytov phase on an `n`×`n` grid, row-major `[x * n + y]`.
///
/// Sample `(i, j)` lies at position `(i, j) * spacing` relative to the
/// sphere centre, wrapped periodically.
fn rytov_phase(request: &SphereRequest, n: usize, spacing: f64) -> Vec<Complex64> {
    let km = request.medium_wavenumber();
    let km_sq = km * km;
    let rel = request.sphere_index / request.medium_index;
    let delta_f = km_sq * (rel * rel - 1.0);
    let dk = 2.0 * PI / (n as f64 * spacing);

    let mut buf = vec![Complex64::new(0.0, 0.0); n * n];
    for a in 0..n {
        let kx = fft_index(a, n) * dk;
        for b in 0..n {
            let ky = fft_index(b, n) * dk;
            let kperp_sq = kx * kx + ky * ky;
            if kperp_sq >= km_sq {
                continue;
            }
            let kz = (km_sq - kperp_sq).sqrt();
            let qz = kz - km;
            let q = (kperp_sq + qz * qz).sqrt();
            let ft = delta_f * sphere_transform(q, request.radius);
            buf[a * n + b] = Complex64::new(0.0, 0.5 / kz)
                * ft
                * Complex64::from_polar(1.0, qz * request.focus);
        }
    }

    inverse_fft_2d(&mut buf, n);

    // Continuous inverse transform: sum * dk^2 / (2 pi)^2 = sum / (n spacing)^2
    let norm = 1.0 / (n as f64 * spacing).powi(2);
    for v in buf.iter_mut() {
        *v *= norm;
    }
    buf
}

/// Unnormalised 2D inverse FFT of a square row-major buffer.
fn inverse_fft_2d(buf: &mut [Complex64], n: usize) {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_inverse(n);

    // rows
    fft.process(buf);

    // columns
    let mut column = vec![Complex64::new(0.0, 0.0); n];
    for b in 0..n {
        for a in 0..n {
            column[a] = buf[a * n + b];
        }
        fft.process(&mut column);
        for a in 0..n {
            buf[a * n + b] = column[a];
        }
    }
}

/// Bilinear interpolation at fractional sample `(u, v)` with periodic wrap.
fn sample_bilinear(data: &[Complex64], n: usize, u: f64, v: f64) -> Complex64 {
    let u0 = u.floor();
    let v0 = v.floor();
    let fu = u - u0;
    let fv = v - v0;
    let wrap = |i: f64| (i as i64).rem_euclid(n as i64) as usize;
    let (i0, j0) = (wrap(u0), wrap(v0));
    let (i1, j1) = ((i0 + 1) % n, (j0 + 1) % n);

    data[i0 * n + j0] * ((1.0 - fu) * (1.0 - fv))
        + data[i1 * n + j0] * (fu * (1.0 - fv))
        + data[i0 * n + j1] * ((1.0 - fu) * fv)
        + data[i1 * n + j1] * (fu * fv)
}
