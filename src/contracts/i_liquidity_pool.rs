use ethers::prelude::abigen;

abigen!(
    ILiquidityPool,
    r#"[
        function mint(address tokenIn, uint256 amountIn, uint256 minShares, address receiver) external payable returns (uint256)
        function redeem(address tokenOut, uint256 shareAmount, uint256 minOut, address receiver) external returns (uint256)
        function swap(address tokenIn, address tokenOut, uint256 amountIn, uint256 minOut, address receiver) external payable returns (uint256)
    ]"#
);
