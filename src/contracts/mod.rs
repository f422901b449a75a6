// Contracts Module - Public ABIs Only

pub mod i_convert_router;
pub mod i_curve_factory;
pub mod i_curve_pool;
pub mod i_liquidity_pool;
pub mod i_peg_stability;
pub mod i_weth;

// Public exports. Call structs are re-exported with disambiguating names so
// the routes can build calldata without touching the generated modules.
pub use i_convert_router::{
    IConvertRouter, SellPeggedToPoolCall, SellPeggedToPoolToCurveCall,
};
pub use i_curve_factory::ICurveFactory;
pub use i_curve_pool::ICurvePool;
pub use i_liquidity_pool::{
    ILiquidityPool, MintCall as PoolMintCall, RedeemCall as PoolRedeemCall,
    SwapCall as PoolSwapCall,
};
pub use i_peg_stability::{
    DepositCall as PsmDepositCall, IPegStability, WithdrawCall as PsmWithdrawCall,
};
pub use i_weth::{DepositCall as WethDepositCall, IWETH, WithdrawCall as WethWithdrawCall};
