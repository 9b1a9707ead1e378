use jiggle_bones::*;

fn main() {
    let mut skeleton = Skeleton::new();
    let head = skeleton.add_bone(
        "head",
        None,
        Transform::from_position(Vec3::new(0.0, 1.7, 0.0)),
    );
    let strand = skeleton.add_strand(
        "ponytail",
        Some(head),
        Transform::from_position(Vec3::new(0.0, 0.05, -0.1)),
        Vec3::new(0.0, -0.08, -0.02),
        6,
    );

    let settings = ChainSettings::new(strand[0])
        .with_gravity(Vec3::new(0.0, -9.8, 0.0))
        .with_damping(0.2)
        .with_elasticity(0.05)
        .with_stiffness(0.2)
        .with_inertia(0.5)
        .with_radius(0.02)
        .with_end_length(0.5)
        .with_collider(ColliderConfig::sphere(0.11).with_bone(head));

    let chain = match BoneChain::build(&settings, &skeleton) {
        Ok(chain) => chain,
        Err(err) => {
            eprintln!("could not build ponytail: {err}");
            return;
        }
    };
    println!("Ponytail has {} particles", chain.particle_count());

    let mut scheduler = FrameScheduler::with_config(SchedulerConfig::default().with_frame_budget_ms(2.0));
    scheduler.register(chain);

    let dt = 1.0 / 60.0;
    for frame in 0..120 {
        // Turn the head left and right.
        let yaw = (frame as f32 * dt * 3.0).sin() * 0.8;
        skeleton.set_local_transform(
            head,
            Transform::from_position_rotation(Vec3::new(0.0, 1.7, 0.0), Quat::from_rotation_y(yaw)),
        );
        scheduler.update(&mut skeleton, dt);

        if frame % 30 == 0 {
            if let Some(tip) = skeleton.world_transform(strand[strand.len() - 1]) {
                println!("frame {frame:3}: ponytail tip at {:?}", tip.position);
            }
        }
    }

    let profile = scheduler.last_profile();
    println!(
        "Last frame: {} particles in {:.3} ms",
        profile.particle_count,
        profile.total_frame_time.as_secs_f32() * 1000.0
    );
    scheduler.shutdown();
}
