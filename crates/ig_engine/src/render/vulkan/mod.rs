//! Vulkan bootstrap
//!
//! Instance creation, physical-device resolution, and logical-device setup.
//! No swapchain or frame submission exists yet; the context stops at a usable
//! device with graphics and present queues.

pub mod device;
pub mod instance;

pub use device::{
    AdapterCapabilities, DiscreteGpuPolicy, LogicalDevice, QueueFamilyCapabilities,
    SuitabilityPolicy,
};
pub use instance::VulkanInstance;

use ash::extensions::khr::Surface;
use ash::vk;
use thiserror::Error;

use crate::config::VulkanConfig;
use crate::render::window::Window;

/// Vulkan bootstrap errors
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Vulkan setup failed before any device existed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Adapter enumeration returned zero devices
    #[error("No Vulkan-capable adapters found")]
    NoAdaptersFound,

    /// No enumerated adapter satisfied the suitability policy
    #[error("No suitable adapter among {considered} enumerated (policy: {policy})")]
    NoSuitableAdapter {
        /// How many adapters were enumerated and evaluated
        considered: usize,
        /// Human-readable name of the policy that was applied
        policy: String,
    },

    /// One or more required validation layers are not installed
    #[error("Missing required validation layers: {}", .0.join(", "))]
    MissingValidationLayers(Vec<String>),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Main Vulkan context that owns all core Vulkan resources
pub struct VulkanContext {
    surface: vk::SurfaceKHR,
    surface_loader: Surface,
    adapter: AdapterCapabilities,
    // Declaration order matters: the logical device must drop before the
    // instance that created it.
    device: LogicalDevice,
    instance: VulkanInstance,
}

impl VulkanContext {
    /// Create a Vulkan context for the window using the default adapter policy
    pub fn new(window: &mut Window, config: &VulkanConfig) -> VulkanResult<Self> {
        Self::with_policy(window, config, &DiscreteGpuPolicy)
    }

    /// Create a Vulkan context, selecting the adapter with a caller-supplied
    /// suitability policy
    pub fn with_policy(
        window: &mut Window,
        config: &VulkanConfig,
        policy: &dyn SuitabilityPolicy,
    ) -> VulkanResult<Self> {
        let instance = VulkanInstance::new(window, config)?;

        let surface_loader = Surface::new(&instance.entry, &instance.instance);
        let surface = window
            .create_vulkan_surface(instance.instance.handle())
            .map_err(|e| VulkanError::InitializationFailed(format!("Surface creation: {e}")))?;

        // The capability map is rebuilt on every selection attempt and
        // discarded once the chosen adapter is extracted.
        let capability_map = device::build_capability_map(
            &instance.instance,
            surface,
            &surface_loader,
        )?;
        let adapter = device::select_adapter(&capability_map, policy)?.clone();
        log::info!("Selected GPU: {}", adapter.name());

        let device = LogicalDevice::new(&instance.instance, &adapter)?;

        Ok(Self {
            surface,
            surface_loader,
            adapter,
            device,
            instance,
        })
    }

    /// Get a reference to the Vulkan instance
    pub fn instance(&self) -> &ash::Instance {
        &self.instance.instance
    }

    /// Get the surface handle
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Get the selected adapter's capabilities
    pub fn adapter(&self) -> &AdapterCapabilities {
        &self.adapter
    }

    /// Get the selected adapter's reported name
    pub fn adapter_name(&self) -> String {
        self.adapter.name()
    }

    /// Get the logical device
    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
        // Remaining fields drop in declaration order: logical device first,
        // then the instance that created it.
    }
}
