//! Vulkan instance creation with validation-layer auditing
//!
//! The validation toggle is an explicit configuration value, not a build-time
//! constant; when validation is requested, every missing layer is reported in
//! one pass so the user sees the full gap list at once.

use ash::extensions::ext::DebugUtils;
use ash::vk;
use ash::Entry;
use std::ffi::{CStr, CString};

use super::{VulkanError, VulkanResult};
use crate::config::VulkanConfig;
use crate::render::window::Window;

/// Validation layers requested when validation is enabled
pub const VALIDATION_LAYERS: &[&str] = &["VK_LAYER_KHRONOS_validation"];

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    /// Vulkan entry point
    pub entry: Entry,
    /// Vulkan instance handle
    pub instance: ash::Instance,
    debug_utils: Option<DebugUtils>,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl VulkanInstance {
    /// Create a new Vulkan instance, auditing validation layers first when
    /// they are enabled in the configuration
    pub fn new(window: &Window, config: &VulkanConfig) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }.map_err(|e| {
            VulkanError::InitializationFailed(format!("Failed to load Vulkan: {e:?}"))
        })?;

        let enable_validation = config.validation_enabled();
        if enable_validation {
            audit_validation_layers(&entry, VALIDATION_LAYERS)?;
        }

        let app_name = CString::new(config.application_name.as_str()).map_err(|_| {
            VulkanError::InitializationFailed("Application name contains NUL".to_string())
        })?;
        let engine_name = CString::new("OpenIG").map_err(|_| {
            VulkanError::InitializationFailed("Engine name contains NUL".to_string())
        })?;
        let (major, minor, patch) = config.application_version;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let required_extensions = window.get_required_instance_extensions().map_err(|e| {
            VulkanError::InitializationFailed(format!("Failed to get required extensions: {e}"))
        })?;
        let cstr_extensions: Vec<CString> = required_extensions
            .iter()
            .map(|ext| CString::new(ext.as_str()))
            .collect::<Result<_, _>>()
            .map_err(|_| {
                VulkanError::InitializationFailed("Extension name contains NUL".to_string())
            })?;
        let mut extensions: Vec<*const i8> =
            cstr_extensions.iter().map(|ext| ext.as_ptr()).collect();
        if enable_validation {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layer_names: Vec<CString> = if enable_validation {
            VALIDATION_LAYERS
                .iter()
                .filter_map(|name| CString::new(*name).ok())
                .collect()
        } else {
            Vec::new()
        };
        let layer_names_ptrs: Vec<*const i8> =
            layer_names.iter().map(|name| name.as_ptr()).collect();

        let mut debug_info = debug_messenger_create_info();
        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names_ptrs);
        if enable_validation {
            // Covers messages emitted during instance creation itself
            create_info = create_info.push_next(&mut debug_info);
        }

        let instance = unsafe {
            entry
                .create_instance(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        let (debug_utils, debug_messenger) = if enable_validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            let messenger = unsafe {
                debug_utils
                    .create_debug_utils_messenger(&debug_messenger_create_info(), None)
                    .map_err(VulkanError::Api)?
            };
            (Some(debug_utils), Some(messenger))
        } else {
            (None, None)
        };

        Ok(Self {
            entry,
            instance,
            debug_utils,
            debug_messenger,
        })
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils, &self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Check that every required validation layer is installed, reporting the full
/// list of missing layers rather than failing on the first miss
fn audit_validation_layers(entry: &Entry, required: &[&str]) -> VulkanResult<()> {
    let available = entry
        .enumerate_instance_layer_properties()
        .map_err(VulkanError::Api)?;

    let missing = missing_layer_names(&available, required);
    if missing.is_empty() {
        return Ok(());
    }
    for layer in &missing {
        log::error!("Missing required validation layer: {layer}");
    }
    Err(VulkanError::MissingValidationLayers(missing))
}

/// Collect every required layer name absent from the available set
fn missing_layer_names(available: &[vk::LayerProperties], required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| {
            !available.iter().any(|props| {
                let layer_name = unsafe { CStr::from_ptr(props.layer_name.as_ptr()) };
                layer_name.to_string_lossy() == **name
            })
        })
        .map(|name| (*name).to_string())
        .collect()
}

fn debug_messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Debug callback routing validation messages into the log
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let callback_data = *callback_data;
    let message = CStr::from_ptr(callback_data.p_message).to_string_lossy();

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!("[Vulkan] {message_type:?} - {message}");
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::warn!("[Vulkan] {message_type:?} - {message}");
    } else {
        log::debug!("[Vulkan] {message_type:?} - {message}");
    }

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str) -> vk::LayerProperties {
        let mut props = vk::LayerProperties::default();
        for (i, byte) in name.bytes().enumerate() {
            props.layer_name[i] = byte as _;
        }
        props
    }

    #[test]
    fn test_no_missing_layers_when_all_available() {
        let available = [layer("VK_LAYER_KHRONOS_validation"), layer("VK_LAYER_MESA_overlay")];
        let missing = missing_layer_names(&available, &["VK_LAYER_KHRONOS_validation"]);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_missing_layers_reported_exhaustively() {
        let available = [layer("VK_LAYER_MESA_overlay")];
        let missing = missing_layer_names(
            &available,
            &["VK_LAYER_KHRONOS_validation", "VK_LAYER_LUNARG_api_dump"],
        );
        assert_eq!(
            missing,
            vec![
                "VK_LAYER_KHRONOS_validation".to_string(),
                "VK_LAYER_LUNARG_api_dump".to_string(),
            ]
        );
    }

    #[test]
    fn test_layer_name_prefix_does_not_match() {
        let available = [layer("VK_LAYER_KHRONOS_validation_extra")];
        let missing = missing_layer_names(&available, &["VK_LAYER_KHRONOS_validation"]);
        assert_eq!(missing.len(), 1);
    }
}
