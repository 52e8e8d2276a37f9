use control::Control;
use kpts::*;
use symmetry::{IrMeshDriver, RotationMeshDriver, SpgCell};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn simple_cubic() -> SpgCell {
    SpgCell::from_species(
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        vec![[0.0, 0.0, 0.0]],
        &["Si".to_string()],
    )
    .unwrap()
}

const KLINES: &str = "
G 0.0 0.0 0.0   X 0.5 0.0 0.0
X 0.5 0.0 0.0   M 0.5 0.5 0.0
";

#[test]
fn test_full_mesh() {
    init_logger();

    let control = Control::parse("kpts_scheme = kmesh\nkmesh = 2 2 2\n").unwrap();
    let provider = kpts::new(&control, None, None, None).unwrap();

    assert_eq!(provider.get_n_kpts(), 8);
    assert_eq!(provider.get_k_mesh(), Some([2, 2, 2]));

    for ik in 0..provider.get_n_kpts() {
        assert_eq!(provider.get_k_degeneracy(ik), 1);
        assert_eq!(provider.get_k_weight(ik), 0.125);
    }
}

#[test]
fn test_irreducible_mesh() {
    init_logger();

    let control = Control::parse(
        "
        kmesh       = 2 2 2
        kmesh_shift = 1 1 1
        symmetry    = true
        ",
    )
    .unwrap();

    let driver: Box<dyn IrMeshDriver> = Box::new(RotationMeshDriver::new(vec![], true));
    let provider = kpts::new(&control, Some(simple_cubic()), Some(driver), None).unwrap();

    assert_eq!(provider.get_n_kpts(), 4);

    let total: usize = (0..provider.get_n_kpts()).map(|ik| provider.get_k_degeneracy(ik)).sum();
    assert_eq!(total, 8);
}

#[test]
fn test_irreducible_mesh_needs_cell() {
    init_logger();

    let control = Control::parse("kmesh = 2 2 2\nsymmetry = true\n").unwrap();
    let driver: Box<dyn IrMeshDriver> = Box::new(RotationMeshDriver::new(vec![], true));

    assert!(matches!(
        kpts::new(&control, None, Some(driver), None),
        Err(KptsError::InsufficientInput(_))
    ));

    // without spglib there is no default driver
    #[cfg(not(feature = "spglib"))]
    assert!(matches!(
        kpts::new(&control, Some(simple_cubic()), None, None),
        Err(KptsError::InsufficientInput(_))
    ));
}

#[test]
fn test_kline() {
    init_logger();

    let control = Control::parse("kpts_scheme = kline\nkline_npts = 5\n").unwrap();
    let provider = kpts::new(&control, None, None, Some(KLINES)).unwrap();

    assert_eq!(provider.get_n_kpts(), 10);
    assert_eq!(provider.get_k_mesh(), None);
    assert_eq!(provider.get_k_frac(4), provider.get_k_frac(5));

    assert!(matches!(
        kpts::new(&control, None, None, None),
        Err(KptsError::InsufficientInput(_))
    ));
}

#[test]
fn test_control_error_converts() {
    fn build(text: &str) -> KptsResult<Box<dyn KPTS>> {
        let control = Control::parse(text)?;
        kpts::new(&control, None, None, None)
    }

    assert!(matches!(build("kmesh = 0 1 1"), Err(KptsError::Control(_))));
    assert!(matches!(build("ecut_wfc = 400"), Err(KptsError::Control(_))));
    assert!(build("kmesh = 1 1 1").is_ok());
}
