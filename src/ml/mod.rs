// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here.
//
//   layers.rs        conv / transposed conv / pool / norm helpers
//   blocks.rs        down, up, residual and discriminator blocks
//   fnet.rs          flow estimation network
//   generator.rs     x4 super-resolution generator
//   discriminator.rs adversarial discriminator + feature maps
//   warp.rs          backward warping, space-to-depth
//   recurrent.rs     FNet + generator run frame by frame
//   losses.rs        adversarial, content, feature matching
//   trainer.rs       GAN training loop
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Sajjadi et al. (2018) Frame-Recurrent Video Super-Resolution
//            Chu et al. (2020) Temporally Coherent GANs for Video Super-Resolution

pub mod layers;
pub mod blocks;
pub mod fnet;
pub mod generator;
pub mod discriminator;
pub mod warp;
pub mod recurrent;
pub mod losses;
pub mod trainer;
