//! Render graph definition and compilation

use std::collections::{BTreeSet, HashMap};

use crate::error::{GraphError, GraphResult};
use crate::render_graph::pass::*;
use crate::render_graph::resource::*;

/// Configuration for a [`RenderGraph`]
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Upper bound on transient texture memory per frame. Requests past the
    /// budget get [`TextureHandle::INVALID`]. `None` means unbounded.
    pub max_transient_bytes: Option<u64>,
}

/// The per-frame render graph.
///
/// Passes are added with their declared accesses; the graph infers the
/// dependency edges from those declarations at compile time. A graph is
/// rebuilt every frame: [`RenderGraph::clear`] drops every pass and resource
/// and invalidates all handles handed out so far.
#[derive(Debug, Default)]
pub struct RenderGraph {
    config: GraphConfig,
    generation: u32,
    resources: Vec<VirtualResource>,
    passes: Vec<RasterPass>,
    /// Explicit ordering edges as (dependent, dependency) pairs.
    edges: Vec<(PassId, PassId)>,
    transient_bytes: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Frame generation; handles from other generations are stale.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Start a new frame.
    pub fn clear(&mut self) {
        self.resources.clear();
        self.passes.clear();
        self.edges.clear();
        self.transient_bytes = 0;
        self.generation = self.generation.wrapping_add(1);
        // INVALID uses u32::MAX; never hand that generation out.
        if self.generation == u32::MAX {
            self.generation = 0;
        }
    }

    /// Register a texture owned outside the graph (camera target, G-buffer,
    /// back buffer). Imported textures are considered initialized.
    pub fn import_texture(&mut self, name: &str, desc: TextureDescriptor) -> TextureHandle {
        let handle = self.next_handle();
        self.resources.push(VirtualResource::Imported(VirtualTexture {
            handle,
            desc,
            name: name.to_string(),
        }));
        handle
    }

    /// Request a transient texture for this frame.
    ///
    /// Every call yields a fresh handle. Returns [`TextureHandle::INVALID`]
    /// when the descriptor is empty, its size overflows, or the frame's
    /// transient budget would be exceeded.
    pub fn create_texture(&mut self, desc: &TextureDescriptor, name: &str) -> TextureHandle {
        if desc.is_empty() {
            log::debug!(
                "Refusing transient texture '{}': empty size {}x{}",
                name,
                desc.width,
                desc.height
            );
            return TextureHandle::INVALID;
        }

        let budget = self.config.max_transient_bytes.unwrap_or(u64::MAX);
        let total = desc
            .size_in_bytes()
            .and_then(|size| self.transient_bytes.checked_add(size))
            .filter(|&total| total <= budget);
        let Some(total) = total else {
            log::debug!(
                "Refusing transient texture '{}': {}x{} {:?} over budget ({} of {} used)",
                name,
                desc.width,
                desc.height,
                desc.format,
                self.transient_bytes,
                budget
            );
            return TextureHandle::INVALID;
        };

        self.transient_bytes = total;
        let handle = self.next_handle();
        self.resources.push(VirtualResource::Transient(VirtualTexture {
            handle,
            desc: desc.clone(),
            name: name.to_string(),
        }));
        handle
    }

    /// Hand the most recently requested transient texture back to the pool.
    ///
    /// Only the last request can be released, and only while no pass uses
    /// it, which is enough to undo a batch of requests that failed partway.
    /// The handle must not be used afterwards. Returns whether the texture
    /// was released.
    pub fn release_texture(&mut self, handle: TextureHandle) -> bool {
        let is_last = self.contains_texture(handle) && handle.index() + 1 == self.resources.len();
        let unused = !self.passes.iter().any(|p| p.touches_resource(handle));
        if !is_last || !unused {
            return false;
        }
        let Some(VirtualResource::Transient(texture)) = self.resources.last() else {
            return false;
        };

        let size = texture.desc.size_in_bytes().unwrap_or(0);
        self.transient_bytes = self.transient_bytes.saturating_sub(size);
        log::trace!("Released transient texture '{}'", texture.name);
        self.resources.pop();
        true
    }

    /// Whether `handle` was produced by this graph during the current frame.
    pub fn contains_texture(&self, handle: TextureHandle) -> bool {
        handle.is_valid()
            && handle.generation == self.generation
            && handle.index() < self.resources.len()
    }

    pub fn resource(&self, handle: TextureHandle) -> Option<&VirtualResource> {
        if self.contains_texture(handle) {
            self.resources.get(handle.index())
        } else {
            None
        }
    }

    pub fn texture_descriptor(&self, handle: TextureHandle) -> Option<&TextureDescriptor> {
        self.resource(handle).map(VirtualResource::desc)
    }

    pub fn texture_name(&self, handle: TextureHandle) -> Option<&str> {
        self.resource(handle).map(VirtualResource::name)
    }

    /// Transient memory requested so far this frame.
    pub fn transient_bytes(&self) -> u64 {
        self.transient_bytes
    }

    /// Number of transient textures requested so far this frame.
    pub fn transient_count(&self) -> usize {
        self.resources.iter().filter(|r| !r.is_imported()).count()
    }

    pub fn resources(&self) -> &[VirtualResource] {
        &self.resources
    }

    /// Add a fully configured raster pass.
    ///
    /// The pass is rejected, and the graph left untouched, when it
    /// references a texture from another frame, lacks exactly one
    /// attachment or a render function, samples its own attachment, or
    /// reads a transient texture no earlier pass has written.
    pub fn add_raster_pass(&mut self, pass: RasterPass) -> GraphResult<PassId> {
        self.validate_pass(&pass)?;

        let id = PassId(self.passes.len() as u32);
        log::trace!(
            "Added pass '{}' ({} reads)",
            pass.name(),
            pass.reads().count()
        );
        self.passes.push(pass);
        Ok(id)
    }

    fn validate_pass(&self, pass: &RasterPass) -> GraphResult<()> {
        let name = pass.name();

        for access in pass.accesses() {
            let handle = access.resource;
            if !handle.is_valid() {
                return Err(GraphError::InvalidTexture {
                    pass: name.to_string(),
                });
            }
            if !self.contains_texture(handle) {
                return Err(GraphError::StaleTexture { texture: handle });
            }
        }

        let attachment = match pass.writes().count() {
            0 => return Err(GraphError::MissingRenderAttachment(name.to_string())),
            1 => pass
                .render_attachment()
                .ok_or_else(|| GraphError::MissingRenderAttachment(name.to_string()))?,
            _ => return Err(GraphError::MultipleRenderAttachments(name.to_string())),
        };

        if pass.reads_resource(attachment) {
            return Err(GraphError::ReadWriteConflict {
                pass: name.to_string(),
                texture: attachment,
            });
        }

        if !pass.has_render_func() {
            return Err(GraphError::MissingRenderFunc(name.to_string()));
        }

        for read in pass.reads() {
            let Some(VirtualResource::Transient(texture)) = self.resource(read) else {
                continue;
            };
            let written = self.passes.iter().any(|p| p.writes_resource(read));
            if !written {
                return Err(GraphError::ReadBeforeWrite {
                    pass: name.to_string(),
                    texture: texture.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Add an ordering edge that is not expressed through resources.
    ///
    /// The `dependent` pass will execute after the `dependency` pass.
    pub fn add_dependency(&mut self, dependent: PassId, dependency: PassId) -> GraphResult<()> {
        for id in [dependent, dependency] {
            if id.index() >= self.passes.len() {
                return Err(GraphError::UnknownPass(id));
            }
        }
        if dependent == dependency {
            return Err(GraphError::CyclicDependency);
        }
        if !self.edges.contains(&(dependent, dependency)) {
            self.edges.push((dependent, dependency));
        }
        Ok(())
    }

    pub fn passes(&self) -> &[RasterPass] {
        &self.passes
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn get_pass(&self, id: PassId) -> Option<&RasterPass> {
        self.passes.get(id.index())
    }

    pub(crate) fn get_pass_mut(&mut self, id: PassId) -> Option<&mut RasterPass> {
        self.passes.get_mut(id.index())
    }

    /// Find a pass by name.
    pub fn find_pass(&self, name: &str) -> Option<PassId> {
        self.passes
            .iter()
            .position(|p| p.name() == name)
            .map(|i| PassId(i as u32))
    }

    /// Passes that `id` must wait for, from declared accesses and explicit
    /// edges.
    ///
    /// Accesses are versioned by submission order: a later pass depends on
    /// an earlier one when they touch the same texture and at least one of
    /// them writes it.
    pub fn dependencies(&self, id: PassId) -> BTreeSet<PassId> {
        let mut deps = BTreeSet::new();
        let Some(pass) = self.get_pass(id) else {
            return deps;
        };

        for (index, earlier) in self.passes[..id.index()].iter().enumerate() {
            let hazard = pass.accesses().iter().any(|access| {
                if access.is_write() {
                    earlier.touches_resource(access.resource)
                } else {
                    earlier.writes_resource(access.resource)
                }
            });
            if hazard {
                deps.insert(PassId(index as u32));
            }
        }

        deps.extend(
            self.edges
                .iter()
                .filter(|&&(dependent, _)| dependent == id)
                .map(|&(_, dependency)| dependency),
        );
        deps
    }

    /// Compile the graph - topological sort and resource lifetimes.
    ///
    /// Ties are broken by submission order, so the result is deterministic.
    pub fn compile(&self) -> GraphResult<CompiledGraph> {
        let count = self.passes.len();
        let dependencies: Vec<BTreeSet<PassId>> = (0..count)
            .map(|i| self.dependencies(PassId(i as u32)))
            .collect();

        // Kahn's algorithm
        let mut in_degree: Vec<usize> = dependencies.iter().map(BTreeSet::len).collect();
        let mut ready: BTreeSet<PassId> = (0..count)
            .filter(|&i| in_degree[i] == 0)
            .map(|i| PassId(i as u32))
            .collect();
        let mut pass_order = Vec::with_capacity(count);

        while let Some(pass_id) = ready.pop_first() {
            pass_order.push(pass_id);
            for (index, deps) in dependencies.iter().enumerate() {
                if deps.contains(&pass_id) {
                    in_degree[index] -= 1;
                    if in_degree[index] == 0 {
                        ready.insert(PassId(index as u32));
                    }
                }
            }
        }

        if pass_order.len() != count {
            return Err(GraphError::CyclicDependency);
        }

        let mut resource_lifetimes: HashMap<TextureHandle, ResourceLifetime> = HashMap::new();
        for (order, &pass_id) in pass_order.iter().enumerate() {
            let pass = &self.passes[pass_id.index()];
            for access in pass.accesses() {
                let lifetime = resource_lifetimes
                    .entry(access.resource)
                    .or_insert(ResourceLifetime {
                        first_use: order,
                        last_use: order,
                    });
                lifetime.last_use = order;
            }
        }

        Ok(CompiledGraph {
            generation: self.generation,
            pass_order,
            dependencies,
            resource_lifetimes,
        })
    }

    fn next_handle(&self) -> TextureHandle {
        TextureHandle::new(self.resources.len() as u32, self.generation)
    }
}

/// Resource lifetime in terms of pass execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLifetime {
    pub first_use: usize,
    pub last_use: usize,
}

/// Compiled render graph with execution order and resource lifetimes
#[derive(Debug)]
pub struct CompiledGraph {
    pub(crate) generation: u32,
    pass_order: Vec<PassId>,
    dependencies: Vec<BTreeSet<PassId>>,
    resource_lifetimes: HashMap<TextureHandle, ResourceLifetime>,
}

impl CompiledGraph {
    pub fn pass_order(&self) -> &[PassId] {
        &self.pass_order
    }

    /// Dependencies of `id` as resolved at compile time.
    pub fn dependencies(&self, id: PassId) -> Option<&BTreeSet<PassId>> {
        self.dependencies.get(id.index())
    }

    pub fn lifetime(&self, resource: TextureHandle) -> Option<ResourceLifetime> {
        self.resource_lifetimes.get(&resource).copied()
    }

    /// Check if a resource is alive at a given execution step
    pub fn is_resource_alive(&self, resource: TextureHandle, step: usize) -> bool {
        if let Some(lifetime) = self.resource_lifetimes.get(&resource) {
            step >= lifetime.first_use && step <= lifetime.last_use
        } else {
            false
        }
    }
}
