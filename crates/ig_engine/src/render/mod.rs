//! Rendering setup: host window management and Vulkan bootstrap

pub mod vulkan;
pub mod window;

pub use vulkan::VulkanContext;
pub use window::Window;
