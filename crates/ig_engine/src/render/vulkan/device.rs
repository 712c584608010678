//! Physical-device resolution and logical-device creation
//!
//! Maps every enumerated adapter to the queue families it exposes, then picks
//! the first adapter (in enumerated order, so the winner is deterministic
//! across runs) that satisfies a suitability policy. The queue-family scan is
//! factored over an injected present-support lookup so the selection logic is
//! testable without a GPU.

use ash::extensions::khr::Surface;
use ash::vk;
use ash::{Device, Instance};
use std::ffi::CStr;

use super::{VulkanError, VulkanResult};

/// Queue-family capabilities resolved for one adapter
///
/// Indices are only ever set from families the adapter actually reported;
/// `None` means "not yet found", not "incapable". Graphics and present are
/// tracked separately because they may live in different families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyCapabilities {
    /// First family index supporting graphics commands
    pub graphics_family: Option<u32>,
    /// First family index supporting presentation to the surface
    pub present_family: Option<u32>,
}

impl QueueFamilyCapabilities {
    /// True when both a graphics-capable and a present-capable family have
    /// been found (not necessarily the same index)
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// The distinct family indices to instantiate queues for, in ascending
    /// order
    ///
    /// Graphics and present may coincide; requesting the same family twice on
    /// device creation is invalid, so coinciding indices collapse to one.
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families: Vec<u32> = self
            .graphics_family
            .iter()
            .chain(self.present_family.iter())
            .copied()
            .collect();
        families.sort_unstable();
        families.dedup();
        families
    }
}

/// One adapter's handle, properties, and resolved queue-family capabilities
///
/// The capability map is the `Vec` of these, in enumerated order.
#[derive(Clone)]
pub struct AdapterCapabilities {
    /// Vulkan physical device handle
    pub adapter: vk::PhysicalDevice,
    /// Device properties and limits
    pub properties: vk::PhysicalDeviceProperties,
    /// Resolved queue-family capabilities
    pub capabilities: QueueFamilyCapabilities,
}

impl AdapterCapabilities {
    /// The adapter name reported by the driver
    pub fn name(&self) -> String {
        let name = unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) };
        name.to_string_lossy().into_owned()
    }
}

/// Suitability predicate over an adapter's properties and capabilities
///
/// Kept as a policy object so callers can swap the selection criteria without
/// touching the resolution machinery.
pub trait SuitabilityPolicy {
    /// Human-readable policy name used in selection diagnostics
    fn name(&self) -> &str;

    /// Whether this adapter qualifies for rendering and presentation
    fn is_suitable(
        &self,
        properties: &vk::PhysicalDeviceProperties,
        capabilities: &QueueFamilyCapabilities,
    ) -> bool;
}

/// Default policy: discrete GPU with a complete capability set
pub struct DiscreteGpuPolicy;

impl SuitabilityPolicy for DiscreteGpuPolicy {
    fn name(&self) -> &str {
        "discrete GPU with graphics and present queues"
    }

    fn is_suitable(
        &self,
        properties: &vk::PhysicalDeviceProperties,
        capabilities: &QueueFamilyCapabilities,
    ) -> bool {
        properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
            && capabilities.is_complete()
    }
}

/// Scan one adapter's queue families in ascending index order
///
/// Records the first graphics-capable and first present-capable family
/// (possibly different indices) and stops as soon as both are found; any
/// complete pair is acceptable, so scanning further buys nothing.
pub fn resolve_queue_families<F>(
    families: &[vk::QueueFamilyProperties],
    mut present_support: F,
) -> VulkanResult<QueueFamilyCapabilities>
where
    F: FnMut(u32) -> VulkanResult<bool>,
{
    let mut capabilities = QueueFamilyCapabilities::default();

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;

        if capabilities.graphics_family.is_none()
            && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        {
            capabilities.graphics_family = Some(index);
        }

        if capabilities.present_family.is_none() && present_support(index)? {
            capabilities.present_family = Some(index);
        }

        if capabilities.is_complete() {
            break;
        }
    }

    Ok(capabilities)
}

/// Build the capability map for every adapter visible to the instance
///
/// Fails with [`VulkanError::NoAdaptersFound`] when enumeration returns zero
/// devices; the caller decides whether that aborts startup. The map is built
/// fresh on every call, never cached.
pub fn build_capability_map(
    instance: &Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &Surface,
) -> VulkanResult<Vec<AdapterCapabilities>> {
    let adapters = unsafe {
        instance
            .enumerate_physical_devices()
            .map_err(VulkanError::Api)?
    };

    if adapters.is_empty() {
        log::error!("Vulkan enumeration reported zero physical devices");
        return Err(VulkanError::NoAdaptersFound);
    }

    let mut map = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        let properties = unsafe { instance.get_physical_device_properties(adapter) };
        let families =
            unsafe { instance.get_physical_device_queue_family_properties(adapter) };

        let capabilities = resolve_queue_families(&families, |index| unsafe {
            surface_loader
                .get_physical_device_surface_support(adapter, index, surface)
                .map_err(VulkanError::Api)
        })?;

        let entry = AdapterCapabilities {
            adapter,
            properties,
            capabilities,
        };
        log::debug!(
            "Adapter \"{}\": graphics={:?} present={:?}",
            entry.name(),
            capabilities.graphics_family,
            capabilities.present_family
        );
        map.push(entry);
    }

    Ok(map)
}

/// Select the first adapter in enumerated order that satisfies the policy
///
/// Fatal to the bootstrap on failure: the error carries how many adapters were
/// considered and which policy was applied, so the diagnostic is actionable.
pub fn select_adapter<'a>(
    capability_map: &'a [AdapterCapabilities],
    policy: &dyn SuitabilityPolicy,
) -> VulkanResult<&'a AdapterCapabilities> {
    capability_map
        .iter()
        .find(|entry| policy.is_suitable(&entry.properties, &entry.capabilities))
        .ok_or_else(|| VulkanError::NoSuitableAdapter {
            considered: capability_map.len(),
            policy: policy.name().to_string(),
        })
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    /// Vulkan logical device handle
    pub device: Device,
    /// Graphics operations queue
    pub graphics_queue: vk::Queue,
    /// Surface presentation queue
    pub present_queue: vk::Queue,
    /// Index of the graphics queue family
    pub graphics_family: u32,
    /// Index of the presentation queue family
    pub present_family: u32,
}

impl LogicalDevice {
    /// Create a logical device on the selected adapter
    ///
    /// Exactly one queue-creation request is issued per distinct family index
    /// from [`QueueFamilyCapabilities::unique_families`], each at uniform
    /// priority.
    pub fn new(instance: &Instance, selected: &AdapterCapabilities) -> VulkanResult<Self> {
        let graphics_family = selected.capabilities.graphics_family.ok_or_else(|| {
            VulkanError::InitializationFailed(
                "Selected adapter has no graphics queue family".to_string(),
            )
        })?;
        let present_family = selected.capabilities.present_family.ok_or_else(|| {
            VulkanError::InitializationFailed(
                "Selected adapter has no present queue family".to_string(),
            )
        })?;

        let priorities = [1.0_f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = selected
            .capabilities
            .unique_families()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
                    .build()
            })
            .collect();

        let device_features = vk::PhysicalDeviceFeatures::default();
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_features(&device_features);

        let device = unsafe {
            instance
                .create_device(selected.adapter, &create_info, None)
                .map_err(VulkanError::Api)?
        };

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            graphics_family,
            present_family,
        })
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: 1,
            ..Default::default()
        }
    }

    fn adapter(
        raw: u64,
        device_type: vk::PhysicalDeviceType,
        capabilities: QueueFamilyCapabilities,
    ) -> AdapterCapabilities {
        AdapterCapabilities {
            adapter: vk::PhysicalDevice::from_raw(raw),
            properties: vk::PhysicalDeviceProperties {
                device_type,
                ..Default::default()
            },
            capabilities,
        }
    }

    fn caps(graphics: u32, present: u32) -> QueueFamilyCapabilities {
        QueueFamilyCapabilities {
            graphics_family: Some(graphics),
            present_family: Some(present),
        }
    }

    #[test]
    fn test_complete_with_split_families() {
        let families = [
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::COMPUTE),
            family(vk::QueueFlags::TRANSFER),
        ];

        let capabilities =
            resolve_queue_families(&families, |index| Ok(index == 2)).unwrap();

        assert_eq!(capabilities.graphics_family, Some(0));
        assert_eq!(capabilities.present_family, Some(2));
        assert!(capabilities.is_complete());
    }

    #[test]
    fn test_first_family_of_each_kind_wins() {
        let families = [
            family(vk::QueueFlags::TRANSFER),
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::GRAPHICS),
        ];

        let capabilities = resolve_queue_families(&families, |_| Ok(true)).unwrap();

        assert_eq!(capabilities.graphics_family, Some(1));
        assert_eq!(capabilities.present_family, Some(0));
    }

    #[test]
    fn test_scan_stops_once_complete() {
        let families = [
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::GRAPHICS),
            family(vk::QueueFlags::GRAPHICS),
        ];

        let mut probes = 0;
        let capabilities = resolve_queue_families(&families, |_| {
            probes += 1;
            Ok(true)
        })
        .unwrap();

        assert_eq!(capabilities, caps(0, 0));
        assert_eq!(probes, 1);
    }

    #[test]
    fn test_incomplete_without_present_support() {
        let families = [family(vk::QueueFlags::GRAPHICS)];

        let capabilities = resolve_queue_families(&families, |_| Ok(false)).unwrap();

        assert_eq!(capabilities.graphics_family, Some(0));
        assert_eq!(capabilities.present_family, None);
        assert!(!capabilities.is_complete());
    }

    #[test]
    fn test_probe_failure_propagates() {
        let families = [family(vk::QueueFlags::GRAPHICS)];

        let result = resolve_queue_families(&families, |_| {
            Err(VulkanError::Api(vk::Result::ERROR_SURFACE_LOST_KHR))
        });

        assert!(matches!(result, Err(VulkanError::Api(_))));
    }

    #[test]
    fn test_unique_families_collapse_coinciding_indices() {
        assert_eq!(caps(2, 2).unique_families(), vec![2]);
        assert_eq!(caps(0, 2).unique_families(), vec![0, 2]);
        assert_eq!(caps(2, 0).unique_families(), vec![0, 2]);
    }

    #[test]
    fn test_selects_discrete_adapter_over_integrated() {
        let map = vec![
            adapter(1, vk::PhysicalDeviceType::INTEGRATED_GPU, caps(0, 2)),
            adapter(2, vk::PhysicalDeviceType::DISCRETE_GPU, caps(1, 1)),
        ];

        let selected = select_adapter(&map, &DiscreteGpuPolicy).unwrap();

        assert_eq!(selected.adapter, vk::PhysicalDevice::from_raw(2));
    }

    #[test]
    fn test_selects_first_qualifying_in_enumerated_order() {
        let map = vec![
            adapter(1, vk::PhysicalDeviceType::DISCRETE_GPU, caps(0, 0)),
            adapter(2, vk::PhysicalDeviceType::DISCRETE_GPU, caps(0, 0)),
        ];

        let selected = select_adapter(&map, &DiscreteGpuPolicy).unwrap();

        assert_eq!(selected.adapter, vk::PhysicalDevice::from_raw(1));
    }

    #[test]
    fn test_incomplete_discrete_adapter_is_rejected() {
        let incomplete = QueueFamilyCapabilities {
            graphics_family: Some(0),
            present_family: None,
        };
        let map = vec![adapter(1, vk::PhysicalDeviceType::DISCRETE_GPU, incomplete)];

        assert!(select_adapter(&map, &DiscreteGpuPolicy).is_err());
    }

    #[test]
    fn test_no_suitable_adapter_diagnostic() {
        let map = vec![
            adapter(1, vk::PhysicalDeviceType::INTEGRATED_GPU, caps(0, 0)),
            adapter(2, vk::PhysicalDeviceType::CPU, caps(0, 0)),
        ];

        match select_adapter(&map, &DiscreteGpuPolicy) {
            Err(VulkanError::NoSuitableAdapter { considered, policy }) => {
                assert_eq!(considered, 2);
                assert!(policy.contains("discrete"));
            }
            Err(e) => panic!("expected NoSuitableAdapter, got {e:?}"),
            Ok(_) => panic!("expected NoSuitableAdapter, got a selection"),
        }
    }
}
