//! Shading program bundle consumed by the reflection nodes
//!
//! The program itself is authored outside this crate. What matters here is
//! its contract: two kernels sharing the same bound textures, addressed by
//! [`KernelKind`] instead of a bare pass index.

/// Texture slot both kernels read the packed normal/roughness buffer from.
pub const GBUFFER2_SLOT: &str = "_GBuffer2Texture";

/// The two computations a reflection program provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Marches rays through screen space and writes the raw reflection estimate.
    Raymarch,
    /// Blends the raw estimate over scene color.
    Composite,
}

impl KernelKind {
    pub const ALL: [KernelKind; 2] = [KernelKind::Raymarch, KernelKind::Composite];
}

/// One kernel of a program, as the backend addresses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    name: String,
    pass_index: u32,
}

impl Kernel {
    pub fn new(name: impl Into<String>, pass_index: u32) -> Self {
        Self {
            name: name.into(),
            pass_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the kernel inside its program.
    pub fn pass_index(&self) -> u32 {
        self.pass_index
    }
}

/// A shading program bundle holding the raymarch and composite kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionProgram {
    name: String,
    raymarch: Kernel,
    composite: Kernel,
}

impl ReflectionProgram {
    /// Program laid out with the raymarch kernel first and the composite
    /// kernel second.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raymarch: Kernel::new("Raymarch", 0),
            composite: Kernel::new("Composite", 1),
        }
    }

    /// Program with an explicit kernel layout.
    pub fn with_kernels(name: impl Into<String>, raymarch: Kernel, composite: Kernel) -> Self {
        Self {
            name: name.into(),
            raymarch,
            composite,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kernel(&self, kind: KernelKind) -> &Kernel {
        match kind {
            KernelKind::Raymarch => &self.raymarch,
            KernelKind::Composite => &self.composite,
        }
    }
}
